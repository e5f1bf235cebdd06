//! User-facing text in the languages the portal serves.

use axum::http::{header::ACCEPT_LANGUAGE, HeaderMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Th,
}

impl Locale {
    /// Picks the first supported language in `Accept-Language`, ignoring quality weights.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
        else {
            return Locale::default();
        };

        for tag in value.split(',') {
            let tag = tag.split(';').next().unwrap_or("").trim().to_lowercase();
            if tag.starts_with("th") {
                return Locale::Th;
            }
            if tag.starts_with("en") {
                return Locale::En;
            }
        }

        Locale::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    RegistrationComplete,
    EmailVerified,
    EmailAlreadyVerified,
    VerificationSent,
    PasswordResetRequested,
    PasswordResetComplete,
    PasswordChanged,
    SignedIn,
    ResetLinkValid,
    ResetLinkInvalid,
    InvalidInput,
    DuplicateEmail,
    InvalidToken,
    ExpiredToken,
    RateLimited { minutes: u64 },
    Unauthorized,
    InvalidCredentials,
    EmailNotVerified,
    Internal,
}

impl Message {
    pub fn text(self, locale: Locale) -> String {
        match locale {
            Locale::En => self.english(),
            Locale::Th => self.thai(),
        }
    }

    fn english(self) -> String {
        let text = match self {
            Message::RegistrationComplete => {
                "Registration successful. Please check your email to verify your account."
            }
            Message::EmailVerified => "Your email has been verified. You can now sign in.",
            Message::EmailAlreadyVerified => "Your email is already verified. You can sign in.",
            Message::VerificationSent => {
                "If an unverified account exists for this email, a new verification link has been sent."
            }
            Message::PasswordResetRequested => {
                "If an account exists for this email, a password reset link has been sent."
            }
            Message::PasswordResetComplete => {
                "Your password has been reset. You can now sign in with your new password."
            }
            Message::PasswordChanged => "Your password has been changed.",
            Message::SignedIn => "Signed in successfully.",
            Message::ResetLinkValid => "The password reset link is valid.",
            Message::ResetLinkInvalid => "The password reset link is invalid or has expired.",
            Message::InvalidInput => "Please check the information you entered.",
            Message::DuplicateEmail => "This email is already registered.",
            Message::InvalidToken => "This link is invalid or has already been used.",
            Message::ExpiredToken => "This link has expired. Please request a new one.",
            Message::RateLimited { minutes } => {
                let unit = if minutes == 1 { "minute" } else { "minutes" };
                return format!("Too many requests. Please try again in {minutes} {unit}.");
            }
            Message::Unauthorized => "Please sign in to continue.",
            Message::InvalidCredentials => "Incorrect email or password.",
            Message::EmailNotVerified => "Please verify your email before signing in.",
            Message::Internal => "Something went wrong. Please try again later.",
        };

        text.to_string()
    }

    fn thai(self) -> String {
        let text = match self {
            Message::RegistrationComplete => {
                "ลงทะเบียนสำเร็จ กรุณาตรวจสอบอีเมลเพื่อยืนยันบัญชีของคุณ"
            }
            Message::EmailVerified => "ยืนยันอีเมลเรียบร้อยแล้ว คุณสามารถเข้าสู่ระบบได้",
            Message::EmailAlreadyVerified => "อีเมลของคุณได้รับการยืนยันแล้ว คุณสามารถเข้าสู่ระบบได้",
            Message::VerificationSent => {
                "หากมีบัญชีที่ยังไม่ได้ยืนยันสำหรับอีเมลนี้ ระบบได้ส่งลิงก์ยืนยันใหม่ให้แล้ว"
            }
            Message::PasswordResetRequested => {
                "หากมีบัญชีสำหรับอีเมลนี้ ระบบได้ส่งลิงก์สำหรับรีเซ็ตรหัสผ่านให้แล้ว"
            }
            Message::PasswordResetComplete => {
                "รีเซ็ตรหัสผ่านเรียบร้อยแล้ว คุณสามารถเข้าสู่ระบบด้วยรหัสผ่านใหม่ได้"
            }
            Message::PasswordChanged => "เปลี่ยนรหัสผ่านเรียบร้อยแล้ว",
            Message::SignedIn => "เข้าสู่ระบบสำเร็จ",
            Message::ResetLinkValid => "ลิงก์รีเซ็ตรหัสผ่านใช้งานได้",
            Message::ResetLinkInvalid => "ลิงก์รีเซ็ตรหัสผ่านไม่ถูกต้องหรือหมดอายุแล้ว",
            Message::InvalidInput => "กรุณาตรวจสอบข้อมูลที่กรอก",
            Message::DuplicateEmail => "อีเมลนี้ถูกใช้ลงทะเบียนแล้ว",
            Message::InvalidToken => "ลิงก์นี้ไม่ถูกต้องหรือถูกใช้งานไปแล้ว",
            Message::ExpiredToken => "ลิงก์นี้หมดอายุแล้ว กรุณาขอลิงก์ใหม่",
            Message::RateLimited { minutes } => {
                return format!("คุณส่งคำขอบ่อยเกินไป กรุณาลองใหม่อีกครั้งใน {minutes} นาที");
            }
            Message::Unauthorized => "กรุณาเข้าสู่ระบบเพื่อดำเนินการต่อ",
            Message::InvalidCredentials => "อีเมลหรือรหัสผ่านไม่ถูกต้อง",
            Message::EmailNotVerified => "กรุณายืนยันอีเมลก่อนเข้าสู่ระบบ",
            Message::Internal => "เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้งภายหลัง",
        };

        text.to_string()
    }
}

/// Rate limit waits are shown in whole minutes, rounded up.
pub fn minutes_until(retry_after_seconds: u64) -> u64 {
    retry_after_seconds.div_ceil(60).max(1)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn locale_from_accept_language() {
        assert_eq!(Locale::from_headers(&HeaderMap::new()), Locale::En);
        assert_eq!(Locale::from_headers(&headers("th-TH,th;q=0.9")), Locale::Th);
        assert_eq!(Locale::from_headers(&headers("en-US,th;q=0.5")), Locale::En);
        assert_eq!(Locale::from_headers(&headers("fr-FR, th;q=0.8")), Locale::Th);
        assert_eq!(Locale::from_headers(&headers("fr-FR")), Locale::En);
    }

    #[test]
    fn rate_limit_minutes_round_up() {
        assert_eq!(minutes_until(600), 10);
        assert_eq!(minutes_until(541), 10);
        assert_eq!(minutes_until(1), 1);
        assert_eq!(minutes_until(0), 1);
    }

    #[test]
    fn rate_limit_message_mentions_minutes() {
        let text = Message::RateLimited { minutes: 10 }.text(Locale::En);
        assert_eq!(text, "Too many requests. Please try again in 10 minutes.");

        let text = Message::RateLimited { minutes: 1 }.text(Locale::En);
        assert!(text.ends_with("1 minute."));

        let text = Message::RateLimited { minutes: 3 }.text(Locale::Th);
        assert!(text.contains("3 นาที"));
    }
}
