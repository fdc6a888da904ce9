//! Outbound message rendering.

use chrono::Duration;

/// Rendered email: subject and HTML body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
}

fn minutes(ttl: Duration) -> i64 {
    // Round up so a 90 second window never reads as "1 minute".
    (ttl.num_seconds() + 59) / 60
}

/// Render the verification email.
pub fn render_email(platform_name: &str, code: &str, ttl: Duration) -> EmailMessage {
    let minutes = minutes(ttl);
    EmailMessage {
        subject: format!("Your {} verification code", platform_name),
        html_body: format!(
            "<html><body>\
             <p>Your {platform} verification code is:</p>\
             <h2 style=\"letter-spacing:4px\">{code}</h2>\
             <p>This code expires in {minutes} minutes. \
             If you did not request it, you can ignore this email.</p>\
             </body></html>",
            platform = platform_name,
            code = code,
            minutes = minutes,
        ),
    }
}

/// Render the verification SMS body.
pub fn render_sms(platform_name: &str, code: &str, ttl: Duration) -> String {
    format!(
        "{} verification code: {}. Valid for {} minutes.",
        platform_name,
        code,
        minutes(ttl)
    )
}
