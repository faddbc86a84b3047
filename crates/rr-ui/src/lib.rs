//! # rr-ui
//!
//! Askama templates for the server-rendered account pages.

use askama::Template;
use rr_core::models::{Community, User};

/// One-shot message shown on the next rendered page.
///
/// Only the short code travels in the flash cookie; the text lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LoggedIn,
    LoggedOut,
    Registered,
    LoginFailed,
}

impl Notice {
    pub fn code(&self) -> &'static str {
        match self {
            Notice::LoggedIn => "logged-in",
            Notice::LoggedOut => "logged-out",
            Notice::Registered => "registered",
            Notice::LoginFailed => "login-failed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "logged-in" => Some(Notice::LoggedIn),
            "logged-out" => Some(Notice::LoggedOut),
            "registered" => Some(Notice::Registered),
            "login-failed" => Some(Notice::LoginFailed),
            _ => None,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Notice::LoggedIn => "You are now logged in.",
            Notice::LoggedOut => "You have been logged out.",
            Notice::Registered => "Registration successful. Log in to activate your account.",
            Notice::LoginFailed => "Invalid username or password.",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::LoginFailed)
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub title: &'a str,
    pub notice: Option<Notice>,
    pub username: &'a str,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate<'a> {
    pub title: &'a str,
    pub notice: Option<Notice>,
    /// Field-specific message from the last attempt
    pub error: Option<&'a str>,
    pub username: &'a str,
    pub email: &'a str,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate<'a> {
    pub title: &'a str,
    pub notice: Option<Notice>,
    pub user: Option<&'a User>,
    pub communities: &'a [Community],
}
