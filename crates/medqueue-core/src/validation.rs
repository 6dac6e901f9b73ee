//! 输入校验
//!
//! 在任何持久化动作之前完成，失败时返回 `MedQueueError::Validation`。

use chrono::NaiveTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{MedQueueError, Result};

pub const MAX_AGE: i32 = 120;
pub const MIN_PASSWORD_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email pattern")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 ()\-.]{2,31}$").expect("valid phone pattern"))
}

/// 必填文本，返回去除首尾空白后的值
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MedQueueError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// 可选文本，空白视为未填写
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_age(age: i32) -> Result<u8> {
    if age < 0 {
        return Err(MedQueueError::Validation("Age must be positive".to_string()));
    }
    if age > MAX_AGE {
        return Err(MedQueueError::Validation(format!("Age cannot exceed {}", MAX_AGE)));
    }
    Ok(age as u8)
}

pub fn validate_phone(phone: &str) -> Result<String> {
    let phone = require_text("Phone number", phone)?;
    if !phone_regex().is_match(&phone) {
        return Err(MedQueueError::Validation(format!("Invalid phone number: {}", phone)));
    }
    Ok(phone)
}

/// 邮箱统一转为小写
pub fn validate_email(email: &str) -> Result<String> {
    let email = require_text("Email", email)?;
    if !email_regex().is_match(&email) {
        return Err(MedQueueError::Validation("Invalid email address".to_string()));
    }
    Ok(email.to_lowercase())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MedQueueError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// 预约时间，格式 `HH:MM`
pub fn parse_time_of_day(time: &str) -> Result<String> {
    let time = require_text("Time", time)?;
    let parsed = NaiveTime::parse_from_str(&time, "%H:%M")
        .map_err(|_| MedQueueError::Validation(format!("Invalid time: {}", time)))?;
    Ok(parsed.format("%H:%M").to_string())
}

pub fn validate_wait_time(minutes: i64) -> Result<u32> {
    if minutes < 0 {
        return Err(MedQueueError::Validation("Wait time cannot be negative".to_string()));
    }
    u32::try_from(minutes)
        .map_err(|_| MedQueueError::Validation(format!("Wait time too large: {}", minutes)))
}
