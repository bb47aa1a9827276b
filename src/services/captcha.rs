//! 算术验证码求解 - 业务能力层
//!
//! 表单的验证码形如 "5 + 7 = ?"，数字前后可能夹杂其他文字

use once_cell::sync::Lazy;
use regex::Regex;

static RE_ADDITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*\+\s*(\d+)").unwrap());

/// 一道加法验证码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathChallenge {
    pub left: u128,
    pub right: u128,
}

impl MathChallenge {
    /// 取题目中第一个 "A + B" 形式的加法
    ///
    /// 找不到或数字溢出时返回 `None`
    pub fn parse(question: &str) -> Option<Self> {
        let caps = RE_ADDITION.captures(question)?;
        let left = caps.get(1)?.as_str().parse().ok()?;
        let right = caps.get(2)?.as_str().parse().ok()?;
        Some(Self { left, right })
    }

    pub fn answer(&self) -> Option<u128> {
        self.left.checked_add(self.right)
    }
}

/// 求解验证码，返回填入答案框的字符串
pub fn solve_math_captcha(question: &str) -> Option<String> {
    MathChallenge::parse(question)?
        .answer()
        .map(|sum| sum.to_string())
}
