//! Password-reset email template.

/// Renders the password-reset message for one recipient.
#[derive(Debug, Clone)]
pub struct ResetEmail<'a> {
    /// Base URL of the reset page.
    pub link_base: &'a str,
    /// The signed reset token.
    pub token: &'a str,
    /// How long the link stays valid, in minutes.
    pub ttl_minutes: u64,
    /// Organisation name used in the signature.
    pub sender_name: &'a str,
}

impl ResetEmail<'_> {
    /// Subject line.
    pub fn subject(&self) -> &'static str {
        "Password Reset Request"
    }

    /// The reset link, carrying the token as a query parameter.
    pub fn link(&self) -> String {
        let separator = if self.link_base.contains('?') { '&' } else { '?' };
        format!("{}{separator}token={}", self.link_base, self.token)
    }

    /// HTML body.
    pub fn html(&self) -> String {
        format!(
            "<h2>Password Reset Request</h2>\n\
             <p>Click the link below to reset your password:</p>\n\
             <p><a href=\"{link}\">Reset Password</a></p>\n\
             <p>This link expires in {validity}.</p>\n\
             <p>If you did not request this, please ignore this email.</p>\n\
             <p>{sender}</p>\n",
            link = escape_html(&self.link()),
            validity = describe_minutes(self.ttl_minutes),
            sender = escape_html(self.sender_name),
        )
    }
}

fn describe_minutes(minutes: u64) -> String {
    match minutes {
        60 => "1 hour".to_string(),
        m if m % 60 == 0 => format!("{} hours", m / 60),
        1 => "1 minute".to_string(),
        m => format!("{m} minutes"),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
