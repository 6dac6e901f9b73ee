//! 通用工具函数

use sha2::{Digest, Sha256};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Result;

/// 生成密码盐
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 计算加盐口令摘要，结果为 `salt$hex`
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{}${:x}", salt, hasher.finalize())
}

/// 校验口令是否与存储的摘要一致
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, _)) => hash_password(password, salt) == stored,
        None => false,
    }
}

/// 解析列表过滤参数，空值或 `all` 表示不过滤
pub fn parse_filter_value<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = crate::MedQueueError>,
{
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}
