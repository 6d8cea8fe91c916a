use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("列名不能为空")]
    Empty,
    #[error("列名只能包含英文字母: {0:?}")]
    NonLetter(String),
    #[error("列名必须由同一个字母重复组成: {0:?}")]
    MixedLetters(String),
}

/// Leading alphabetic run of a cell reference: `"B7"` -> `"B"`.
pub fn column_letters(reference: &str) -> &str {
    let end = reference
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(reference.len());
    &reference[..end]
}

/// Advances a column made of one repeated letter: `a` -> `b`, `bb` -> `cc`,
/// `z` -> `aa`, `zz` -> `aaa`.
///
/// This is not base-26 column arithmetic; `ab` or `AZ` are rejected. The
/// result is always lower-case.
pub fn next_letter(column: &str) -> Result<String, ColumnError> {
    if column.is_empty() {
        return Err(ColumnError::Empty);
    }

    let column = column.to_ascii_lowercase();
    if !column.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ColumnError::NonLetter(column));
    }

    let mut chars = column.chars();
    let Some(current) = chars.next() else {
        return Err(ColumnError::Empty);
    };
    if !chars.all(|c| c == current) {
        return Err(ColumnError::MixedLetters(column));
    }

    let length = column.len();
    if current < 'z' {
        let next = (current as u8 + 1) as char;
        Ok(next.to_string().repeat(length))
    } else {
        Ok("a".repeat(length + 1))
    }
}
