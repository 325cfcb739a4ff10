//! Prompt construction
//!
//! One fixed instruction per register. Regeneration embeds the previous
//! result and asks for different wording; nothing verifies that it differs.

use super::register::TargetRegister;

/// System prompt shared by every provider that accepts one
pub const SYSTEM_PROMPT: &str = "あなたは日本語の文章を適切な丁寧さレベルに変換する専門家です。";

/// Whether a completion is a first conversion or a regeneration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionIntent {
    Convert,
    Regenerate,
}

/// A single provider call, built fresh for every dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub intent: CompletionIntent,
}

impl CompletionRequest {
    pub fn conversion(text: &str, register: TargetRegister) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt: conversion_prompt(text, register),
            intent: CompletionIntent::Convert,
        }
    }

    pub fn regeneration(text: &str, register: TargetRegister, previous_result: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt: regeneration_prompt(text, register, previous_result),
            intent: CompletionIntent::Regenerate,
        }
    }
}

/// Instruction sentence for a register
pub fn instruction(register: TargetRegister) -> &'static str {
    match register {
        TargetRegister::Casual => {
            "カジュアルで親しみやすい表現に変換してください。タメ口や砕けた言い回しを使用します。"
        }
        TargetRegister::Normal => "標準的な丁寧さの「です・ます」調の表現に変換してください。",
        TargetRegister::Polite => {
            "非常に丁寧で敬意を込めた敬語表現に変換してください。尊敬語・謙譲語を適切に使用します。"
        }
    }
}

pub fn conversion_prompt(text: &str, register: TargetRegister) -> String {
    format!(
        "以下の日本語文を{}\n\n入力文: {}\n\n変換後の文のみを出力してください。説明や追加情報は不要です。",
        instruction(register),
        text
    )
}

pub fn regeneration_prompt(text: &str, register: TargetRegister, previous_result: &str) -> String {
    format!(
        "以下の日本語文を{}\n\n元の入力文: {}\n前回の変換結果: {}\n\n前回と**異なる表現**で変換してください。意味は同じでも、言い回しを変えてください。\n変換後の文のみを出力してください。説明や追加情報は不要です。",
        instruction(register),
        text,
        previous_result
    )
}
