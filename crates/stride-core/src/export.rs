//! Spreadsheet export of a projection request
//!
//! Supports:
//! - A format-neutral [`Workbook`] model built from a request and its projection
//! - XLSX encoding (Office Open XML package written with `zip`)
//! - CSV encoding (all sheets in one file, separated by `# <sheet>` markers)
//!
//! Every input expense appears as exactly one row of the "Monthly Expenses"
//! sheet, and the summary rows carry the engine's figures unchanged.

use std::io::{Cursor, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;
use zip::write::SimpleFileOptions;

use crate::advice::{format_amount, format_years, GoalAdvice, DEFAULT_TOP_CATEGORIES};
use crate::engine::ProjectionEngine;
use crate::error::{Error, Result};
use crate::models::{Projection, ProjectionRequest};

pub const EXPENSES_SHEET: &str = "Monthly Expenses";
pub const BREAKDOWN_SHEET: &str = "Category Breakdown";
pub const RECOMMENDATIONS_SHEET: &str = "Recommendations";

pub const TOTAL_EXPENSES_LABEL: &str = "TOTAL MONTHLY EXPENSES";
pub const MONTHLY_SAVINGS_LABEL: &str = "MONTHLY SAVINGS";

/// Row index (0-based) of the expense header on the expenses sheet
pub const EXPENSE_HEADER_ROW: usize = 3;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Download filename
    pub fn filename(&self) -> String {
        format!("expense_tracker.{}", self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown export format: {} (use xlsx or csv)", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cell content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Text(String),
    /// Monetary amount, rendered with two decimals
    Number(f64),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    pub bold: bool,
}

impl Cell {
    /// Text cell; control characters are stripped
    pub fn text(s: impl AsRef<str>) -> Self {
        Self {
            value: CellValue::Text(sanitize_cell_text(s.as_ref())),
            bold: false,
        }
    }

    pub fn number(n: f64) -> Self {
        Self {
            value: CellValue::Number(n),
            bold: false,
        }
    }

    pub fn integer(n: i64) -> Self {
        Self {
            value: CellValue::Integer(n),
            bold: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            CellValue::Number(n) => Some(n),
            CellValue::Integer(n) => Some(n as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    /// Column widths in characters, first column first
    pub column_widths: Vec<f64>,
}

impl Sheet {
    fn new(name: impl Into<String>, column_widths: &[f64]) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            column_widths: column_widths.to_vec(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn blank(&mut self) {
        self.rows.push(Vec::new());
    }

    /// First row whose first cell is the text `label`
    pub fn find_row(&self, label: &str) -> Option<&[Cell]> {
        self.rows
            .iter()
            .find(|row| row.first().and_then(Cell::as_text) == Some(label))
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub created_at: DateTime<Utc>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Xlsx => self.to_xlsx(),
            ExportFormat::Csv => self.to_csv(),
        }
    }

    /// Write all sheets into one CSV file
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        for (i, sheet) in self.sheets.iter().enumerate() {
            if i > 0 {
                wtr.write_record([""])?;
            }
            wtr.write_record([format!("# {}", sheet.name)])?;
            for row in &sheet.rows {
                if row.is_empty() {
                    wtr.write_record([""])?;
                    continue;
                }
                wtr.write_record(row.iter().map(csv_field))?;
            }
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| Error::Export(format!("Failed to flush CSV: {}", e)))?;
        debug!(bytes = bytes.len(), "Encoded workbook as CSV");
        Ok(bytes)
    }

    /// Write an Office Open XML spreadsheet package
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        if self.sheets.is_empty() {
            return Err(Error::Export("Workbook has no sheets".to_string()));
        }

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));

        write_part(&mut zip, "[Content_Types].xml", &self.content_types_xml())?;
        write_part(&mut zip, "_rels/.rels", ROOT_RELS_XML)?;
        write_part(&mut zip, "docProps/core.xml", &self.core_props_xml())?;
        write_part(&mut zip, "xl/workbook.xml", &self.workbook_xml())?;
        write_part(&mut zip, "xl/_rels/workbook.xml.rels", &self.workbook_rels_xml())?;
        write_part(&mut zip, "xl/styles.xml", STYLES_XML)?;
        for (i, sheet) in self.sheets.iter().enumerate() {
            write_part(
                &mut zip,
                &format!("xl/worksheets/sheet{}.xml", i + 1),
                &worksheet_xml(sheet),
            )?;
        }

        let bytes = zip.finish()?.into_inner();
        debug!(
            bytes = bytes.len(),
            sheets = self.sheets.len(),
            "Encoded workbook as XLSX"
        );
        Ok(bytes)
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::from(XML_HEADER);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
        xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn core_props_xml(&self) -> String {
        let created = self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Expense Tracker</dc:title><dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created></cp:coreProperties>"#,
            XML_HEADER, created
        )
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(XML_HEADER);
        xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        for (i, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(&sheet_name(&sheet.name)),
                i + 1,
                i + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_rels_xml(&self) -> String {
        let mut xml = String::from(XML_HEADER);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            ));
        }
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            self.sheets.len() + 1
        ));
        xml.push_str("</Relationships>");
        xml
    }
}

/// Validate, project and encode a request in one step
pub fn export_request(
    engine: &ProjectionEngine,
    request: &ProjectionRequest,
    format: ExportFormat,
) -> Result<Vec<u8>> {
    let projection = engine.project(request)?;
    build_workbook(request, &projection).encode(format)
}

/// Lay out the four report sheets for a request and its projection
pub fn build_workbook(request: &ProjectionRequest, projection: &Projection) -> Workbook {
    let sheets = vec![
        expenses_sheet(request, projection),
        breakdown_sheet(projection),
        projection_sheet(projection),
        recommendations_sheet(projection),
    ];
    debug!(
        entries = request.expenses.len(),
        categories = projection.expenses_by_category.len(),
        "Built export workbook"
    );
    Workbook {
        sheets,
        created_at: Utc::now(),
    }
}

/// Name of the month-by-month sheet, e.g. "5-Year Projection"
pub fn projection_sheet_name(years: f64) -> String {
    format!("{}-Year Projection", format_years(years))
}

fn expenses_sheet(request: &ProjectionRequest, projection: &Projection) -> Sheet {
    let mut sheet = Sheet::new(EXPENSES_SHEET, &[20.0, 25.0, 15.0, 15.0]);

    sheet.push(vec![Cell::text("MONTHLY EXPENDITURE TRACKER").bold()]);
    sheet.push(vec![Cell::text(format!(
        "Monthly Income: {}",
        format_amount(projection.monthly_income)
    ))
    .bold()]);
    sheet.blank();
    sheet.push(header(&["Category", "Subcategory", "Amount", "Frequency"]));

    for expense in &request.expenses {
        sheet.push(vec![
            Cell::text(&expense.category),
            Cell::text(&expense.subcategory),
            Cell::number(expense.amount),
            Cell::text(expense.frequency.trim().to_lowercase()),
        ]);
    }

    sheet.blank();
    sheet.push(vec![
        Cell::text(TOTAL_EXPENSES_LABEL).bold(),
        Cell::empty(),
        Cell::number(projection.total_expenses).bold(),
    ]);
    sheet.push(vec![
        Cell::text(MONTHLY_SAVINGS_LABEL).bold(),
        Cell::empty(),
        Cell::number(projection.monthly_savings).bold(),
    ]);
    sheet
}

fn breakdown_sheet(projection: &Projection) -> Sheet {
    let mut sheet = Sheet::new(BREAKDOWN_SHEET, &[25.0, 15.0, 15.0]);

    sheet.push(vec![Cell::text("EXPENSE BREAKDOWN BY CATEGORY").bold()]);
    sheet.blank();
    sheet.push(header(&["Category", "Amount", "Percentage"]));

    for (category, amount) in projection.categories_by_amount() {
        let share = projection.category_share(category).unwrap_or(0.0);
        sheet.push(vec![
            Cell::text(category),
            Cell::number(amount),
            Cell::text(format!("{:.1}%", share)),
        ]);
    }
    sheet
}

fn projection_sheet(projection: &Projection) -> Sheet {
    let mut sheet = Sheet::new(projection_sheet_name(projection.years), &[26.0, 18.0, 20.0, 18.0]);
    let years = format_years(projection.years);

    sheet.push(vec![Cell::text(format!(
        "PATH TO {} ({} YEARS)",
        format_amount(projection.target_amount),
        years
    ))
    .bold()]);
    sheet.blank();
    sheet.push(vec![
        Cell::text("Target Amount"),
        Cell::number(projection.target_amount).bold(),
    ]);
    sheet.push(vec![
        Cell::text("Time Period"),
        Cell::text(format!(
            "{} years ({} months)",
            years, projection.horizon_months
        )),
    ]);
    sheet.push(vec![
        Cell::text("Current Monthly Savings"),
        Cell::number(projection.monthly_savings),
    ]);
    sheet.push(vec![
        Cell::text("Required Monthly Savings"),
        Cell::number(projection.required_monthly_savings).bold(),
    ]);
    let label = if projection.shortfall > 0.0 {
        "(Shortfall)"
    } else {
        "(Surplus)"
    };
    sheet.push(vec![
        Cell::text("Monthly Shortfall/Surplus"),
        Cell::text(format!(
            "{} {}",
            format_amount(projection.shortfall.abs()),
            label
        ))
        .bold(),
    ]);
    sheet.blank();
    sheet.push(vec![Cell::text(
        "Month-by-Month Projection (Assuming Current Savings Rate)",
    )
    .bold()]);
    sheet.blank();
    sheet.push(header(&[
        "Month",
        "Monthly Savings",
        "Cumulative Savings",
        "Target Progress",
    ]));

    for point in projection.timeline() {
        sheet.push(vec![
            Cell::integer(i64::from(point.month)),
            Cell::number(point.monthly_savings),
            Cell::number(point.cumulative_savings),
            Cell::text(format!("{:.1}%", point.progress_percent)),
        ]);
    }
    sheet
}

fn recommendations_sheet(projection: &Projection) -> Sheet {
    let mut sheet = Sheet::new(RECOMMENDATIONS_SHEET, &[80.0]);
    let advice = GoalAdvice::from_projection(projection, DEFAULT_TOP_CATEGORIES);

    sheet.push(vec![Cell::text("RECOMMENDATIONS TO REACH YOUR GOAL").bold()]);
    sheet.blank();
    for line in advice.lines(projection.target_amount, projection.years) {
        if line.is_empty() {
            sheet.blank();
        } else if line.ends_with(':') && !line.starts_with(' ') {
            sheet.push(vec![Cell::text(line).bold()]);
        } else {
            sheet.push(vec![Cell::text(line)]);
        }
    }
    sheet
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|l| Cell::text(l).bold()).collect()
}

/// Strip control characters so labels are safe as cell content
pub fn sanitize_cell_text(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

fn csv_field(cell: &Cell) -> String {
    match &cell.value {
        CellValue::Empty => String::new(),
        // Leading formula characters would be evaluated by spreadsheet apps
        CellValue::Text(s) if s.starts_with(['=', '+', '-', '@']) => format!("'{}", s),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format!("{:.2}", n),
        CellValue::Integer(n) => n.to_string(),
    }
}

// ============================================================================
// XLSX parts
// ============================================================================

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

/// Cell formats: 0 plain, 1 bold, 2 money, 3 bold money
const STYLES_XML: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/><xf numFmtId="4" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="4" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1" applyNumberFormat="1"/></cellXfs></styleSheet>"##;

fn write_part<W: Write + std::io::Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    content: &str,
) -> Result<()> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file(name, options)?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn worksheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

    if !sheet.column_widths.is_empty() {
        xml.push_str("<cols>");
        for (i, width) in sheet.column_widths.iter().enumerate() {
            xml.push_str(&format!(
                r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                i + 1,
                width
            ));
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    for (r, row) in sheet.rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        let row_num = r + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_num));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), row_num);
            match &cell.value {
                CellValue::Empty => {}
                CellValue::Text(s) => xml.push_str(&format!(
                    r#"<c r="{}" s="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    u8::from(cell.bold),
                    escape_xml(s)
                )),
                CellValue::Number(n) => xml.push_str(&format!(
                    r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                    reference,
                    2 + u8::from(cell.bold),
                    n
                )),
                CellValue::Integer(n) => xml.push_str(&format!(
                    r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                    reference,
                    u8::from(cell.bold),
                    n
                )),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Spreadsheet column letters for a 0-based index (0 → A, 26 → AA)
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Excel limits sheet names to 31 characters and forbids `[]:*?/\`
fn sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect()
}

fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
