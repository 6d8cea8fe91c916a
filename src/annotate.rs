use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::column::{column_letters, next_letter};
use crate::config::Config;
use crate::sentiment::{LanguageClient, SentimentAnalyzer, SentimentResult};
use crate::workbook::{Cell, Document, Row, SharedStringPool};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    NoText,
    Annotated { reference: String, index: u32 },
    /// 匹配的单元格没有引用，未写入
    NoReference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    pub analyzed: usize,
    pub annotated: usize,
}

/// Prints `result` and appends the label cell next to `reference`.
pub fn write_result<W: Write>(
    out: &mut W,
    row: &mut Row,
    reference: &str,
    pool: &mut SharedStringPool,
    result: &SentimentResult,
) -> Result<RowOutcome> {
    writeln!(out, "文档情感: {}\n", result.sentiment)?;
    for sentence in &result.sentences {
        writeln!(out, "\t句子情感: {}", sentence.sentiment)?;
        writeln!(out, "\t文本: {}", sentence.text)?;
        writeln!(out, "\t\t正面: {}", sentence.confidence_scores.positive)?;
        writeln!(out, "\t\t中性: {}", sentence.confidence_scores.neutral)?;
        writeln!(out, "\t\t负面: {}\n", sentence.confidence_scores.negative)?;
    }

    let index = pool.resolve_or_insert(result.sentiment.as_str());

    let column = column_letters(reference);
    if column.is_empty() {
        warn!(row = row.index(), "单元格没有引用，跳过写入");
        return Ok(RowOutcome::NoReference);
    }

    let next =
        next_letter(column).with_context(|| format!("无法计算 {reference} 的下一列"))?;
    let target = format!("{}{}", next.to_ascii_uppercase(), row.index());
    row.append_cell(Cell::shared(target.as_str(), index));

    Ok(RowOutcome::Annotated {
        reference: target,
        index,
    })
}

/// Analyzes the first shared-string cell in `row` that has text.
pub fn annotate_row<A, W>(
    row: &mut Row,
    pool: &mut SharedStringPool,
    analyzer: &A,
    out: &mut W,
) -> Result<RowOutcome>
where
    A: SentimentAnalyzer + ?Sized,
    W: Write,
{
    let mut matched = None;
    for cell in row.cells() {
        let Some(index) = cell.shared_index()? else {
            continue;
        };
        let text = pool.get(index)?;
        if text.is_empty() {
            continue;
        }
        matched = Some((cell.reference.clone(), text.to_string()));
        break;
    }

    let Some((reference, text)) = matched else {
        return Ok(RowOutcome::NoText);
    };

    let result = analyzer
        .analyze(&text)
        .with_context(|| format!("分析单元格 {reference} 失败"))?;

    write_result(out, row, &reference, pool, &result)
}

pub fn annotate_document<A, W>(
    document: &mut Document,
    analyzer: &A,
    out: &mut W,
) -> Result<Summary>
where
    A: SentimentAnalyzer + ?Sized,
    W: Write,
{
    let (rows, pool) = document.parts_mut();
    let mut summary = Summary::default();

    for row in rows.iter_mut() {
        summary.rows += 1;
        match annotate_row(row, pool, analyzer, out)? {
            RowOutcome::NoText => {}
            RowOutcome::NoReference => summary.analyzed += 1,
            RowOutcome::Annotated { reference, index } => {
                info!(cell = %reference, index, "label cell appended");
                summary.analyzed += 1;
                summary.annotated += 1;
            }
        }
    }

    Ok(summary)
}

pub fn run(args: impl IntoIterator<Item = std::ffi::OsString>) -> Result<()> {
    run_with(args, |name| env::var(name).ok())
}

/// [`run`] with the environment lookup injected.
pub fn run_with<F>(args: impl IntoIterator<Item = std::ffi::OsString>, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let mut args = args.into_iter();
    let _exe = args.next();

    let Some(input) = args.next() else {
        println!("请提供文件名作为参数，例如：review-sentiment reviews.xlsx");
        return Ok(());
    };

    let config = Config::from_lookup(PathBuf::from(input), lookup)?;
    let client = LanguageClient::new(&config)?;
    let mut document = Document::open(&config.input)?;

    let summary = {
        let mut out = io::stdout().lock();
        annotate_document(&mut document, &client, &mut out)
    };
    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => {
            warn!(path = %config.input.display(), "处理中断，文件未保存");
            return Err(err);
        }
    };

    let saved = document.save()?;
    println!(
        "已分析 {} 条评论，写入 {} 个情感标签，文件已保存: {}",
        summary.analyzed,
        summary.annotated,
        saved.display()
    );
    Ok(())
}
