//! Rendering a monthly report as an A4 PDF.
//!
//! PDFs embed their fonts, so rendering needs a TrueType family on disk. `FontSource` lists the
//! directories searched for one: the configured font directory, `$GASTOS_HOME/fonts`, then the
//! usual system font directories.

use crate::report::{bar_len, percent, MonthlyReport, TITLE};
use crate::Result;
use anyhow::{anyhow, bail};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Document, Element, Margins, SimplePageDecorator};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The family looked for unless configured otherwise.
pub const DEFAULT_FONT_FAMILY: &str = "LiberationSans";

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu-sans-fonts",
    "/usr/share/fonts/TTF",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// DejaVu ships on most Linux systems but does not follow the `<Family>-Regular.ttf` naming.
const DEJAVU_SANS: [&str; 4] = [
    "DejaVuSans.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Oblique.ttf",
    "DejaVuSans-BoldOblique.ttf",
];

/// Where the fonts for PDF output are looked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    family: String,
    dirs: Vec<PathBuf>,
}

impl Default for FontSource {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_FAMILY, Vec::new()).with_system_dirs()
    }
}

impl FontSource {
    /// Looks for `family` in `dirs`, in order. A family named `Foo` is made of `Foo-Regular.ttf`,
    /// `Foo-Bold.ttf`, `Foo-Italic.ttf` and `Foo-BoldItalic.ttf`.
    pub fn new(family: impl Into<String>, dirs: Vec<PathBuf>) -> Self {
        Self {
            family: family.into(),
            dirs,
        }
    }

    /// Adds the usual system font directories after the ones already listed.
    pub fn with_system_dirs(mut self) -> Self {
        self.dirs.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Loads the first usable family. In each directory the configured family is tried first, then
    /// DejaVu Sans.
    ///
    /// # Errors
    /// - Returns an error if no directory holds a complete family.
    pub fn load(&self) -> Result<FontFamily<FontData>> {
        for dir in self.dirs.iter().filter(|d| d.is_dir()) {
            if dir.join(format!("{}-Regular.ttf", self.family)).is_file() {
                let family = genpdf::fonts::from_files(dir, &self.family, None).map_err(|e| {
                    anyhow!("Unable to load the {} fonts in {}: {e}", self.family, dir.display())
                })?;
                debug!("Using the {} fonts in {}", self.family, dir.display());
                return Ok(family);
            }
            if let Some(family) = load_dejavu(dir)? {
                debug!("Using the DejaVuSans fonts in {}", dir.display());
                return Ok(family);
            }
        }
        bail!(
            "No fonts for PDF output were found. Put {0}-Regular.ttf, {0}-Bold.ttf, \
            {0}-Italic.ttf and {0}-BoldItalic.ttf in one of: {1}",
            self.family,
            self.dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

fn load_dejavu(dir: &Path) -> Result<Option<FontFamily<FontData>>> {
    let paths = DEJAVU_SANS.map(|name| dir.join(name));
    if !paths.iter().all(|p| p.is_file()) {
        return Ok(None);
    }
    let [regular, bold, italic, bold_italic] = paths;
    let load = |path: PathBuf| {
        FontData::load(&path, None)
            .map_err(|e| anyhow!("Unable to load the font {}: {e}", path.display()))
    };
    Ok(Some(FontFamily {
        regular: load(regular)?,
        bold: load(bold)?,
        italic: load(italic)?,
        bold_italic: load(bold_italic)?,
    }))
}

/// Cell text with a little padding, as in the Markdown tables.
fn cell(text: &str, style: Style) -> impl Element {
    Paragraph::new(text)
        .styled(style)
        .padded(Margins::trbl(1, 1, 1, 2))
}

/// Right-aligned cell text, for amounts.
fn cell_right(text: &str, style: Style) -> impl Element {
    Paragraph::new(text)
        .aligned(Alignment::Right)
        .styled(style)
        .padded(Margins::trbl(1, 2, 1, 1))
}

fn framed_table(weights: Vec<usize>) -> TableLayout {
    let mut table = TableLayout::new(weights);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    table
}

fn row_error(e: genpdf::error::Error) -> anyhow::Error {
    anyhow!("Unable to lay out the PDF report: {e}")
}

/// Renders `report` as a PDF: the header with the month and grand total, the record table with a
/// totals row, the category breakdown and the daily trend.
///
/// # Errors
/// - Returns an error if the fonts cannot be loaded or the document cannot be rendered.
pub fn render_pdf(report: &MonthlyReport, fonts: &FontSource) -> Result<Vec<u8>> {
    let mut doc = Document::new(fonts.load()?);
    doc.set_title(format!("{TITLE} {}", report.month));

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Margins::trbl(15, 15, 15, 15));
    doc.set_page_decorator(decorator);

    let s_title = Style::new().with_font_size(16).bold();
    let s_section = Style::new().with_font_size(12).bold();
    let s_normal = Style::new().with_font_size(10);
    let s_small = Style::new().with_font_size(8);
    let s_small_bold = Style::new().with_font_size(8).bold();
    let s_muted = Style::new()
        .with_font_size(9)
        .with_color(Color::Greyscale(128));

    doc.push(
        Paragraph::new(TITLE)
            .aligned(Alignment::Center)
            .styled(s_title),
    );
    doc.push(Break::new(1.0));
    doc.push(Paragraph::new(format!("Mes: {}", report.month)).styled(s_normal));
    doc.push(Paragraph::new(format!("Total: {}", report.totals.total)).styled(s_normal.bold()));
    doc.push(Break::new(1.5));

    let mut records = framed_table(vec![3, 5, 4, 3, 3, 3, 3]);
    let mut header = records.row();
    for (ix, title) in [
        "Fecha",
        "Evento",
        "Detalle",
        "Comida",
        "Combustible",
        "Otros",
        "Total",
    ]
    .into_iter()
    .enumerate()
    {
        header = if ix >= 3 {
            header.element(cell_right(title, s_small_bold))
        } else {
            header.element(cell(title, s_small_bold))
        };
    }
    header.push().map_err(row_error)?;
    for r in &report.records {
        records
            .row()
            .element(cell(r.date(), s_small))
            .element(cell(r.event(), s_small))
            .element(cell(r.detail(), s_small))
            .element(cell_right(&r.food().to_string(), s_small))
            .element(cell_right(&r.fuel().to_string(), s_small))
            .element(cell_right(&r.other().to_string(), s_small))
            .element(cell_right(&r.total().to_string(), s_small))
            .push()
            .map_err(row_error)?;
    }
    let t = &report.totals;
    records
        .row()
        .element(cell("TOTALES", s_small_bold))
        .element(cell("", s_small_bold))
        .element(cell("", s_small_bold))
        .element(cell_right(&t.food.to_string(), s_small_bold))
        .element(cell_right(&t.fuel.to_string(), s_small_bold))
        .element(cell_right(&t.other.to_string(), s_small_bold))
        .element(cell_right(&t.total.to_string(), s_small_bold))
        .push()
        .map_err(row_error)?;
    doc.push(records);
    doc.push(Break::new(1.5));

    doc.push(Paragraph::new("Distribución por categoría").styled(s_section));
    doc.push(Break::new(0.5));
    let mut breakdown = framed_table(vec![4, 3, 2]);
    breakdown
        .row()
        .element(cell("Categoría", s_small_bold))
        .element(cell_right("Monto", s_small_bold))
        .element(cell_right("%", s_small_bold))
        .push()
        .map_err(row_error)?;
    for slice in &report.breakdown {
        breakdown
            .row()
            .element(cell(&slice.label, s_small))
            .element(cell_right(&slice.value.to_string(), s_small))
            .element(cell_right(&percent(slice.value, t.total), s_small))
            .push()
            .map_err(row_error)?;
    }
    doc.push(breakdown);
    doc.push(Break::new(1.5));

    doc.push(Paragraph::new("Evolución diaria del gasto").styled(s_section));
    doc.push(Break::new(0.5));
    if report.trend.is_empty() {
        doc.push(Paragraph::new("(sin gastos)").styled(s_muted));
    } else {
        let max = report
            .trend
            .iter()
            .map(|p| p.total.value())
            .max()
            .unwrap_or_default();
        let mut trend = framed_table(vec![3, 3, 8]);
        for point in &report.trend {
            trend
                .row()
                .element(cell(&point.date, s_small))
                .element(cell_right(&point.total.to_string(), s_small))
                .element(cell(&"#".repeat(bar_len(point.total, max)), s_small))
                .push()
                .map_err(row_error)?;
        }
        doc.push(trend);
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| anyhow!("Unable to render the PDF report: {e}"))?;
    debug!(
        "Rendered a {} byte PDF for {} ({} expenses)",
        buffer.len(),
        report.month,
        report.records.len()
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{seed_records, MonthKey};
    use crate::report::monthly_report;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn report(month: &str) -> MonthlyReport {
        monthly_report(&seed_records(), MonthKey::from_str(month).unwrap())
    }

    #[test]
    fn test_default_source_searches_system_dirs() {
        let source = FontSource::default();
        assert_eq!(source.family(), DEFAULT_FONT_FAMILY);
        assert_eq!(source.dirs().len(), SYSTEM_FONT_DIRS.len());
    }

    #[test]
    fn test_missing_fonts_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = FontSource::new("NoSuchFont", vec![dir.path().to_path_buf()]);
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("NoSuchFont-Regular.ttf"));
        assert!(render_pdf(&report("2025-09"), &source).is_err());
    }

    #[test]
    fn test_incomplete_family_is_skipped() {
        let dir = TempDir::new().unwrap();
        // Only the regular face of DejaVu is present
        std::fs::write(dir.path().join("DejaVuSans.ttf"), b"").unwrap();
        let source = FontSource::new("NoSuchFont", vec![dir.path().to_path_buf()]);
        assert!(source.load().is_err());
    }

    #[test]
    fn test_render_pdf() {
        let fonts = FontSource::default();
        if fonts.load().is_err() {
            // No system fonts on this machine
            return;
        }
        let pdf = render_pdf(&report("2025-09"), &fonts).unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let empty = render_pdf(&report("2024-02"), &fonts).unwrap();
        assert!(empty.starts_with(b"%PDF"));
    }
}
