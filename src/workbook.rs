use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use regex::Regex;
use tracing::{debug, info};

use crate::error::SheetError;

fn column_number_to_name(mut column: u32) -> String {
    // 1 -> A, 26 -> Z, 27 -> AA ...
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

fn to_a1(col_1based: u32, row_1based: u32) -> String {
    format!("{}{}", column_number_to_name(col_1based), row_1based)
}

fn datatype_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 {
                format!("{:.0}", n)
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("{e:?}"),
        Data::DateTime(f) => f.to_string(),
        other => format!("{other:?}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// `value` is the decimal index of an entry in the [`SharedStringPool`].
    SharedString,
    /// `value` is the literal cell content.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// A1-style reference such as `B7`. May be empty.
    pub reference: String,
    pub kind: CellKind,
    pub value: String,
}

impl Cell {
    pub fn shared(reference: impl Into<String>, index: u32) -> Self {
        Self {
            reference: reference.into(),
            kind: CellKind::SharedString,
            value: index.to_string(),
        }
    }

    pub fn inline(reference: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            kind: CellKind::Inline,
            value: value.into(),
        }
    }

    /// Pool index of a shared-string cell, `None` for inline cells.
    pub fn shared_index(&self) -> Result<Option<u32>, SheetError> {
        match self.kind {
            CellKind::Inline => Ok(None),
            CellKind::SharedString => self
                .value
                .trim()
                .parse::<u32>()
                .map(Some)
                .map_err(|_| SheetError::InvalidSharedStringIndex(self.value.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    index: u32,
    cells: Vec<Cell>,
    loaded: usize,
}

impl Row {
    pub fn new(index: u32, cells: Vec<Cell>) -> Self {
        let loaded = cells.len();
        Self {
            index,
            cells,
            loaded,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn append_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Cells added since the row was loaded.
    pub fn appended(&self) -> &[Cell] {
        &self.cells[self.loaded..]
    }
}

/// Append-only table of strings referenced by index from shared-string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStringPool {
    items: Vec<String>,
}

impl SharedStringPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn get(&self, index: u32) -> Result<&str, SheetError> {
        self.items
            .get(index as usize)
            .map(String::as_str)
            .ok_or(SheetError::SharedStringOutOfRange {
                index,
                len: self.items.len(),
            })
    }

    pub fn intern(&mut self, text: &str) -> u32 {
        if let Some(i) = self.position(text) {
            return i;
        }
        self.items.push(text.to_string());
        (self.items.len() - 1) as u32
    }

    // 未命中时返回追加前的长度减一（空表时回绕为 u32::MAX），与 intern 不同
    pub fn resolve_or_insert(&mut self, text: &str) -> u32 {
        if let Some(i) = self.position(text) {
            return i;
        }
        let before = self.items.len() as u32;
        self.items.push(text.to_string());
        before.wrapping_sub(1)
    }

    fn position(&self, text: &str) -> Option<u32> {
        self.items.iter().position(|s| s == text).map(|i| i as u32)
    }
}

impl<S: Into<String>> FromIterator<S> for SharedStringPool {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// First worksheet of an xlsx file. Nothing is written until `save`.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    sheet_name: String,
    rows: Vec<Row>,
    pool: SharedStringPool,
}

impl Document {
    pub fn new(
        path: impl Into<PathBuf>,
        sheet_name: impl Into<String>,
        rows: Vec<Row>,
        pool: SharedStringPool,
    ) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
            rows,
            pool,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("无法打开文件: {}", path.display()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("工作簿中没有工作表"))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("无法读取工作表: {sheet_name}"))?;

        // range 不一定从 A1 开始
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let mut pool = SharedStringPool::new();
        let mut rows = Vec::new();

        for (r, data_row) in range.rows().enumerate() {
            let row_num = first_row + r as u32 + 1;
            let mut cells = Vec::new();
            for (c, data) in data_row.iter().enumerate() {
                let reference = to_a1(first_col + c as u32 + 1, row_num);
                match data {
                    Data::Empty => {}
                    // 内联字符串和公式字符串结果也按共享字符串处理
                    Data::String(s) => cells.push(Cell::shared(reference, pool.intern(s))),
                    other => cells.push(Cell::inline(reference, datatype_to_string(other))),
                }
            }
            if !cells.is_empty() {
                rows.push(Row::new(row_num, cells));
            }
        }

        info!(
            path = %path.display(),
            sheet = %sheet_name,
            rows = rows.len(),
            shared_strings = pool.len(),
            "workbook loaded"
        );

        Ok(Self::new(path, sheet_name, rows, pool))
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn pool(&self) -> &SharedStringPool {
        &self.pool
    }

    pub fn parts_mut(&mut self) -> (&mut [Row], &mut SharedStringPool) {
        (&mut self.rows, &mut self.pool)
    }

    /// Writes appended cells back via a sibling temp file and a rename.
    pub fn save(self) -> Result<PathBuf> {
        let mut book = umya_spreadsheet::reader::xlsx::read(&self.path)
            .with_context(|| format!("无法打开文件(写入模式): {}", self.path.display()))?;

        let sheet = book
            .get_sheet_by_name_mut(&self.sheet_name)
            .ok_or_else(|| SheetError::SheetNotFound(self.sheet_name.clone()))?;

        let a1 = Regex::new(r"^[A-Za-z]+[1-9][0-9]*$").context("无法编译正则表达式")?;
        let mut written = 0usize;
        for row in &self.rows {
            for cell in row.appended() {
                if !a1.is_match(&cell.reference) {
                    return Err(SheetError::InvalidReference(cell.reference.clone()).into());
                }
                let target = sheet.get_cell_mut(cell.reference.as_str());
                match cell.shared_index()? {
                    Some(index) => {
                        target.set_value_string(self.pool.get(index)?);
                    }
                    None => {
                        target.set_value(cell.value.as_str());
                    }
                }
                debug!(cell = %cell.reference, value = %cell.value, "cell written");
                written += 1;
            }
        }

        // 符号链接要写到真实文件上，不能替换链接本身
        let target = fs::canonicalize(&self.path)
            .with_context(|| format!("无法解析路径: {}", self.path.display()))?;
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::Builder::new()
            .prefix(".review-sentiment-")
            .suffix(".xlsx")
            .tempfile_in(dir)
            .with_context(|| format!("无法创建临时文件: {}", dir.display()))?;

        umya_spreadsheet::writer::xlsx::write(&book, tmp.path())
            .with_context(|| format!("无法保存文件: {}", tmp.path().display()))?;
        tmp.persist(&target)
            .with_context(|| format!("无法保存文件: {}", target.display()))?;

        info!(path = %self.path.display(), cells = written, "workbook saved");
        Ok(self.path)
    }
}
