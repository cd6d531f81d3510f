/// Message templates for account mail
///
/// User-supplied text (the account name) is HTML-escaped before it is placed
/// in a body. Links are generated by the server and inserted as-is.

use super::EmailMessage;

pub const VERIFICATION_SUBJECT: &str = "mynotebook - verify your email";
pub const RESET_SUBJECT: &str = "mynotebook - reset your password";

/// Escapes the five HTML-significant characters
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Mail asking a new user to confirm their address
pub fn verification_email(to: &str, name: &str, link: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: VERIFICATION_SUBJECT.to_string(),
        html: format!(
            "<h2>{}! Thanks for registering on our site</h2>\n\
             <h4>Please verify your mail to continue...</h4>\n\
             <a href=\"{}\">Verify your email</a>",
            escape_html(name),
            link
        ),
    }
}

/// Mail carrying a password-reset link
pub fn password_reset_email(to: &str, name: &str, link: &str, valid_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: RESET_SUBJECT.to_string(),
        html: format!(
            "<h2>{}! Your reset password link</h2>\n\
             <h4>Please click the link to reset your password. It expires in {} minutes.</h4>\n\
             <a href=\"{}\">Reset your password</a>",
            escape_html(name),
            valid_minutes,
            link
        ),
    }
}
