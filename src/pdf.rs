use std::io::{BufWriter, Cursor};
use std::path::Path;

use chrono::{Datelike, Weekday};
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::*;

use crate::error::{Result, TimesheetError};
use crate::month::weekday_portuguese_short;
use crate::timesheet_data::{DayRecord, MonthlyTimesheet, Shift, TemplateVariant};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 10.0;
const TABLE_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const ROW_HEIGHT_MM: f64 = 5.5;
const HEADER_ROW_HEIGHT_MM: f64 = 7.0;
const LOGO_HEIGHT_MM: f64 = 18.0;

const INSTITUTION_LINES: [&str; 5] = [
    "ESTADO DA PARAÍBA",
    "PREFEITURA MUNICIPAL DE CAMPINA GRANDE",
    "SECRETARIA DE EDUCAÇÃO",
    "DIRETORIA ADMINISTRATIVA FINANCEIRA",
    "GERÊNCIA DE RECURSOS HUMANOS",
];

const INSTITUTION_LINES_V1: [&str; 4] = [
    "ESTADO DA PARAÍBA",
    "PREFEITURA MUNICIPAL DE CAMPINA GRANDE",
    "SECRETARIA MUNICIPAL DE EDUCAÇÃO DE CAMPINA GRANDE",
    "DIRETORIA ADMINISTRATIVA FINANCEIRA/GERÊNCIA DE RECURSOS HUMANOS",
];

/// mm → Mm
fn mm(val: f64) -> Mm {
    Mm(val as f32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Approximate text x for the alignment (Helvetica averages about half an em).
fn calc_text_x(cell_x: f64, cell_w: f64, text: &str, font_size_pt: f32, align: Align) -> f64 {
    let char_width_mm = font_size_pt as f64 * 0.352778; // 1pt = 0.352778mm
    let text_width = text.chars().count() as f64 * char_width_mm * 0.5;
    let padding = 1.0;

    match align {
        Align::Center => cell_x + (cell_w - text_width) / 2.0,
        Align::Left => cell_x + padding,
    }
}

/// Top-left origin → PDF bottom-left origin, baseline centred in the cell.
fn y_convert_text(y_mm: f64, h_mm: f64, font_size_pt: f32) -> Mm {
    let font_size_mm = font_size_pt as f64 * 0.352778;
    let descender = font_size_mm * 0.2;
    let text_y = y_mm + (h_mm + font_size_mm) / 2.0 - descender;
    mm(PAGE_HEIGHT_MM - text_y)
}

fn y_convert(y_mm: f64) -> Mm {
    mm(PAGE_HEIGHT_MM - y_mm)
}

/// What a table column prints for each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Day,
    Entry1,
    Exit1,
    Entry2,
    Exit2,
    /// Signature/justification box, carries the day's note.
    Note,
    /// Class slot (V5), carries the day's note as well.
    Class,
    Hours,
}

struct Column {
    header: &'static str,
    width: f64,
    kind: CellKind,
}

fn col(header: &'static str, width: f64, kind: CellKind) -> Column {
    Column { header, width, kind }
}

const CLASS_WIDTH: f64 = (TABLE_WIDTH_MM - 12.0) / 6.0;

fn columns(template: TemplateVariant) -> Vec<Column> {
    use CellKind::*;
    match template {
        TemplateVariant::V1 => vec![
            col("Dia", 14.0, Day),
            col("Entrada", 22.0, Entry1),
            col("ASSINATURA/JUSTIFICATIVA", 40.0, Note),
            col("Saída", 22.0, Exit1),
            col("ASSINATURA/JUSTIFICATIVA", 40.0, Note),
            // hora extra
            col("H.E. Entrada", 18.0, Entry2),
            col("H.E. Saída", 18.0, Exit2),
            col("Horas", 16.0, Hours),
        ],
        TemplateVariant::V2 | TemplateVariant::V3 => vec![
            col("Dia", 14.0, Day),
            col("Entrada", 22.0, Entry1),
            col("Saída", 22.0, Exit1),
            col("ASSINATURA/JUSTIFICATIVA", 43.0, Note),
            col("Entrada", 22.0, Entry2),
            col("Saída", 22.0, Exit2),
            col("ASSINATURA/JUSTIFICATIVA", 45.0, Note),
        ],
        TemplateVariant::V4 => vec![
            col("Dia", 14.0, Day),
            col("Entrada", 22.0, Entry1),
            col("Saída", 22.0, Exit1),
            col("ASSINATURA", 43.0, Note),
            col("Entrada", 22.0, Entry2),
            col("Saída", 22.0, Exit2),
            col("ASSINATURA", 45.0, Note),
        ],
        TemplateVariant::V5 => vec![
            col("DIA", 12.0, Day),
            col("1ª AULA", CLASS_WIDTH, Class),
            col("2ª AULA", CLASS_WIDTH, Class),
            col("3ª AULA", CLASS_WIDTH, Class),
            col("4ª AULA", CLASS_WIDTH, Class),
            col("5ª AULA", CLASS_WIDTH, Class),
            col("6ª AULA", CLASS_WIDTH, Class),
        ],
        TemplateVariant::V6 => vec![
            col("Dia", 14.0, Day),
            col("Entrada", 38.0, Entry1),
            col("ASSINATURA", 50.0, Note),
            col("Saída", 38.0, Exit1),
            col("ASSINATURA", 50.0, Note),
        ],
    }
}

/// Whether an empty time cell prints "-" instead of staying blank.
fn dash_empty_time(template: TemplateVariant, is_work_day: bool, weekday: Weekday) -> bool {
    let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
    match template {
        TemplateVariant::V2 => !is_work_day && weekend,
        TemplateVariant::V5 => false,
        TemplateVariant::V1 | TemplateVariant::V3 | TemplateVariant::V4 | TemplateVariant::V6 => !is_work_day,
    }
}

fn shift_mark(timesheet: &MonthlyTimesheet, shift: Shift) -> &'static str {
    if timesheet.employee.has_shift(shift) {
        "X"
    } else {
        " "
    }
}

fn shift_line(timesheet: &MonthlyTimesheet) -> String {
    format!(
        "Turno: ({}) Manhã ({}) Tarde ({}) Noite",
        shift_mark(timesheet, Shift::Manha),
        shift_mark(timesheet, Shift::Tarde),
        shift_mark(timesheet, Shift::Noite)
    )
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|s| !s.trim().is_empty()).unwrap_or("N/A")
}

/// Employee block, two entries per line.
fn info_lines(timesheet: &MonthlyTimesheet) -> Vec<(String, String)> {
    let e = &timesheet.employee;
    let school = format!("Unidade de Trabalho: {}", or_na(e.school_name.as_deref()));
    let month = format!("Mês: {}", crate::month::month_name_portuguese(timesheet.month));
    let year = format!("Ano: {}", timesheet.year);
    let registration = format!("Matrícula: {}", or_na(e.registration_number.as_deref()));

    match timesheet.template {
        TemplateVariant::V1 | TemplateVariant::V2 => vec![
            (school, registration),
            (format!("Servidor(a): {}", e.name), format!("Vínculo: {}", e.bond)),
            (format!("Cargo: {}", e.role), format!("Função: {}", e.job_function)),
            (shift_line(timesheet), format!("{}   {}", month, year)),
        ],
        TemplateVariant::V3 => vec![
            (format!("Unidade escolar: {}", or_na(e.school_name.as_deref())), registration),
            (format!("Nome: {}", e.name), format!("Vínculo: {}", e.bond)),
            (format!("Apoio (Função): {}", e.job_function.trim()), shift_line(timesheet)),
            (month, year),
        ],
        TemplateVariant::V4 => vec![
            (school, "CARGA HORÁRIA: 40 HORAS".to_string()),
            (format!("NOME: {}", e.name), shift_line(timesheet)),
            (month, year),
        ],
        TemplateVariant::V5 => vec![
            (school, format!("Vínculo: {}", e.bond)),
            (format!("Nome do(a) Professor(a): {}", e.name), format!("{}   {}", month, year)),
            (
                format!("Disciplina: {}", or_na(e.discipline.as_deref())),
                match e.weekly_hours {
                    Some(h) => format!("Carga Horária Semanal: {} H", h),
                    None => "Carga Horária Semanal: N/A".to_string(),
                },
            ),
            (shift_line(timesheet), String::new()),
        ],
        TemplateVariant::V6 => vec![
            (school, shift_line(timesheet)),
            (
                format!("NOME: {}", e.name),
                match e.weekly_hours {
                    Some(h) => format!("CARGA HORÁRIA: {} HORAS", h),
                    None => "CARGA HORÁRIA: N/A".to_string(),
                },
            ),
            (month, year),
        ],
    }
}

/// Text of one table cell
fn cell_text(column: &Column, record: &DayRecord, dash: bool) -> String {
    let time = |value: &Option<String>| match value.as_deref() {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ if dash => "-".to_string(),
        _ => String::new(),
    };
    match column.kind {
        CellKind::Day => format!("{:02} {}", record.day(), weekday_portuguese_short(record.weekday())),
        CellKind::Entry1 => time(&record.entry_time_1),
        CellKind::Exit1 => time(&record.exit_time_1),
        CellKind::Entry2 => time(&record.entry_time_2),
        CellKind::Exit2 => time(&record.exit_time_2),
        CellKind::Note | CellKind::Class => record.note_str().to_string(),
        CellKind::Hours if record.has_punches() => record.hours_str(),
        CellKind::Hours => String::new(),
    }
}

/// Font and logo for the renderer
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    /// TTF bytes. Builtin Helvetica when None.
    pub font: Option<Vec<u8>>,
    /// PNG bytes drawn at the top-left of every page.
    pub logo_png: Option<Vec<u8>>,
}

impl PdfOptions {
    /// Read the optional font and logo files.
    pub fn load(font_path: Option<&Path>, logo_path: Option<&Path>) -> Result<Self> {
        let font = font_path.map(std::fs::read).transpose()?;
        let logo_png = logo_path.map(std::fs::read).transpose()?;
        Ok(Self { font, logo_png })
    }
}

/// Timesheet PDF writer, one A4 page per employee-month.
pub struct TimesheetPdf {
    doc: PdfDocumentReference,
    first_page_layer: Option<PdfLayerReference>,
    font: IndirectFontRef,
    bold_font: IndirectFontRef,
    logo_png: Option<Vec<u8>>,
    page_count: u32,
}

fn pdf_error(e: impl std::fmt::Display) -> TimesheetError {
    TimesheetError::Pdf(e.to_string())
}

impl TimesheetPdf {
    pub fn new(options: &PdfOptions) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new("Folha de Ponto", mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Layer 1");
        let first_layer = doc.get_page(page).get_layer(layer);

        let (font, bold_font) = match &options.font {
            Some(bytes) => {
                let font = doc.add_external_font(Cursor::new(bytes.clone())).map_err(pdf_error)?;
                (font.clone(), font)
            }
            None => (
                doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
                doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
            ),
        };

        Ok(TimesheetPdf {
            doc,
            first_page_layer: Some(first_layer),
            font,
            bold_font,
            logo_png: options.logo_png.clone(),
            page_count: 0,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Render each timesheet on its own page, in order.
    pub fn render_all(&mut self, timesheets: &[MonthlyTimesheet]) -> Result<()> {
        for timesheet in timesheets {
            self.render(timesheet)?;
        }
        Ok(())
    }

    /// Render one timesheet on a new page.
    pub fn render(&mut self, timesheet: &MonthlyTimesheet) -> Result<()> {
        let layer = self.add_page();

        let mut y = MARGIN_MM;
        self.draw_logo(&layer)?;
        y = self.draw_institution_header(&layer, timesheet.template, y);
        y = self.draw_info_block(&layer, timesheet, y + 2.0);
        y = self.draw_table(&layer, timesheet, y + 2.0);
        self.draw_footer(&layer, timesheet, y + 3.0);

        tracing::debug!(
            employee_id = %timesheet.employee.id,
            template = %timesheet.template,
            page = self.page_count,
            "rendered timesheet page"
        );
        Ok(())
    }

    fn add_page(&mut self) -> PdfLayerReference {
        self.page_count += 1;

        // the document is created with its first page
        match self.first_page_layer.take() {
            Some(layer) => layer,
            None => {
                let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Layer 1");
                self.doc.get_page(page).get_layer(layer)
            }
        }
    }

    fn draw_logo(&self, layer: &PdfLayerReference) -> Result<()> {
        let Some(bytes) = &self.logo_png else {
            return Ok(());
        };
        let decoder = PngDecoder::new(Cursor::new(bytes.as_slice())).map_err(pdf_error)?;
        let image = Image::try_from(decoder).map_err(pdf_error)?;

        let dpi = 300.0;
        let natural_height_mm = image.image.height.0 as f64 / dpi * 25.4;
        let scale = if natural_height_mm > 0.0 {
            LOGO_HEIGHT_MM / natural_height_mm
        } else {
            1.0
        };
        image.add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(mm(MARGIN_MM)),
                translate_y: Some(y_convert(MARGIN_MM + LOGO_HEIGHT_MM)),
                scale_x: Some(scale as f32),
                scale_y: Some(scale as f32),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn draw_institution_header(&self, layer: &PdfLayerReference, template: TemplateVariant, y: f64) -> f64 {
        let lines: &[&str] = match template {
            TemplateVariant::V1 => &INSTITUTION_LINES_V1,
            _ => &INSTITUTION_LINES,
        };
        let line_height = 4.5;
        let mut y = y;
        for line in lines {
            self.text(layer, line, &self.bold_font, 9.0, MARGIN_MM, y, TABLE_WIDTH_MM, line_height, Align::Center);
            y += line_height;
        }
        y += 1.0;
        self.text(
            layer,
            "FOLHA DE PONTO",
            &self.bold_font,
            11.0,
            MARGIN_MM,
            y,
            TABLE_WIDTH_MM,
            6.0,
            Align::Center,
        );
        y + 6.0
    }

    fn draw_info_block(&self, layer: &PdfLayerReference, timesheet: &MonthlyTimesheet, y: f64) -> f64 {
        let half = TABLE_WIDTH_MM / 2.0;
        let line_height = 6.0;
        let mut y = y;
        for (left, right) in info_lines(timesheet) {
            self.draw_rect(layer, MARGIN_MM, y, half, line_height);
            self.draw_rect(layer, MARGIN_MM + half, y, half, line_height);
            self.text(layer, &left, &self.font, 8.5, MARGIN_MM, y, half, line_height, Align::Left);
            self.text(layer, &right, &self.font, 8.5, MARGIN_MM + half, y, half, line_height, Align::Left);
            y += line_height;
        }
        y
    }

    fn draw_table(&self, layer: &PdfLayerReference, timesheet: &MonthlyTimesheet, y: f64) -> f64 {
        let columns = columns(timesheet.template);
        let header_size = 7.0;
        let body_size = 7.5;

        let mut x = MARGIN_MM;
        for column in &columns {
            self.draw_rect(layer, x, y, column.width, HEADER_ROW_HEIGHT_MM);
            self.text(
                layer,
                column.header,
                &self.bold_font,
                header_size,
                x,
                y,
                column.width,
                HEADER_ROW_HEIGHT_MM,
                Align::Center,
            );
            x += column.width;
        }

        let mut y = y + HEADER_ROW_HEIGHT_MM;
        for record in &timesheet.days {
            let dash = dash_empty_time(timesheet.template, timesheet.is_work_day(record), record.date.weekday());
            let mut x = MARGIN_MM;
            for column in &columns {
                self.draw_rect(layer, x, y, column.width, ROW_HEIGHT_MM);
                let text = cell_text(column, record, dash);
                if !text.is_empty() {
                    let font = if matches!(column.kind, CellKind::Note | CellKind::Class) {
                        &self.bold_font
                    } else {
                        &self.font
                    };
                    let align = if column.kind == CellKind::Day { Align::Left } else { Align::Center };
                    self.text(layer, &text, font, body_size, x, y, column.width, ROW_HEIGHT_MM, align);
                }
                x += column.width;
            }
            y += ROW_HEIGHT_MM;
        }
        y
    }

    fn draw_footer(&self, layer: &PdfLayerReference, timesheet: &MonthlyTimesheet, y: f64) {
        let summary = &timesheet.summary;
        let third = TABLE_WIDTH_MM / 3.0;
        let line_height = 6.0;

        let totals = [
            format!("Dias trabalhados: {}", summary.days_with_punches),
            format!("Total de horas: {}", crate::hours::format_hours(summary.total_hours)),
            format!("Dias sem expediente: {}", summary.blocked_days),
        ];
        for (i, label) in totals.iter().enumerate() {
            let x = MARGIN_MM + third * i as f64;
            self.draw_rect(layer, x, y, third, line_height);
            self.text(layer, label, &self.bold_font, 8.0, x, y, third, line_height, Align::Left);
        }

        let y = y + line_height;
        self.draw_rect(layer, MARGIN_MM, y, TABLE_WIDTH_MM, line_height * 2.0);
        self.text(layer, "Obs:", &self.bold_font, 8.0, MARGIN_MM, y, TABLE_WIDTH_MM, line_height, Align::Left);

        let y = y + line_height * 2.0 + 4.0;
        let left_w = TABLE_WIDTH_MM * 0.4;
        self.text(
            layer,
            "Campina Grande, ____/____/____",
            &self.bold_font,
            9.0,
            MARGIN_MM,
            y,
            left_w,
            line_height,
            Align::Center,
        );
        let sign_x = MARGIN_MM + left_w;
        let sign_w = TABLE_WIDTH_MM - left_w;
        self.draw_line(layer, sign_x + 10.0, y + line_height, sign_x + sign_w - 10.0, y + line_height);
        self.text(
            layer,
            "Assinatura do(a) Gestor(a)",
            &self.bold_font,
            9.0,
            sign_x,
            y + line_height,
            sign_w,
            line_height,
            Align::Center,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &self,
        layer: &PdfLayerReference,
        text: &str,
        font: &IndirectFontRef,
        size: f32,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        align: Align,
    ) {
        let tx = calc_text_x(x, w, text, size, align);
        layer.use_text(text, size, mm(tx), y_convert_text(y, h, size), font);
    }

    fn draw_line(&self, layer: &PdfLayerReference, x1: f64, y1: f64, x2: f64, y2: f64) {
        let line = Line {
            points: vec![
                (Point::new(mm(x1), y_convert(y1)), false),
                (Point::new(mm(x2), y_convert(y2)), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn draw_rect(&self, layer: &PdfLayerReference, x: f64, y: f64, w: f64, h: f64) {
        layer.set_outline_thickness(0.2);

        let points = vec![
            (Point::new(mm(x), y_convert(y)), false),
            (Point::new(mm(x + w), y_convert(y)), false),
            (Point::new(mm(x + w), y_convert(y + h)), false),
            (Point::new(mm(x), y_convert(y + h)), false),
        ];
        let rect = Line {
            points,
            is_closed: true,
        };
        layer.add_line(rect);
    }

    /// Write the document into memory.
    pub fn save_to_bytes(self) -> Result<Vec<u8>> {
        let mut writer = BufWriter::new(Cursor::new(Vec::new()));
        self.doc.save(&mut writer).map_err(pdf_error)?;
        let cursor = writer.into_inner().map_err(pdf_error)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holiday::HolidayCalendar;
    use crate::month::generate_month;
    use crate::template;
    use crate::timesheet_data::{Bond, Employee, Role};

    fn employee(id: &str, role: Role, bond: Bond, function: &str) -> Employee {
        Employee {
            id: id.to_string(),
            account_id: "acc".to_string(),
            name: "Maria da Silva".to_string(),
            registration_number: Some("4521".to_string()),
            role,
            bond,
            job_function: function.to_string(),
            work_days: vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            shift: vec![Shift::Manha],
            school_name: Some("EMEF Centro".to_string()),
            discipline: None,
            weekly_hours: Some(20.0),
        }
    }

    fn timesheet(e: Employee) -> MonthlyTimesheet {
        let days = generate_month(&e, 2024, 10, &HolidayCalendar::legacy()).unwrap();
        let template = template::select(&e);
        MonthlyTimesheet::new(e, 2024, 10, template, days)
    }

    #[test]
    fn test_one_page_per_timesheet() {
        let sheets = vec![
            timesheet(employee("1", Role::Asg, Bond::Efetivo, "ASG")),
            timesheet(employee("2", Role::ProfessorFundamentalII, Bond::Contrato, "Matemática")),
            timesheet(employee("3", Role::Vigia, Bond::Contrato, "Vigia")),
        ];
        let mut pdf = TimesheetPdf::new(&PdfOptions::default()).unwrap();
        pdf.render_all(&sheets).unwrap();
        assert_eq!(pdf.page_count(), 3);

        let bytes = pdf.save_to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_dash_rule_per_template() {
        assert!(dash_empty_time(TemplateVariant::V1, false, Weekday::Wed));
        assert!(!dash_empty_time(TemplateVariant::V1, true, Weekday::Sat));
        assert!(dash_empty_time(TemplateVariant::V2, false, Weekday::Sun));
        assert!(!dash_empty_time(TemplateVariant::V2, false, Weekday::Wed));
        assert!(!dash_empty_time(TemplateVariant::V5, false, Weekday::Sat));
        assert!(dash_empty_time(TemplateVariant::V6, false, Weekday::Tue));
    }

    #[test]
    fn test_cell_text() {
        let sheet = timesheet(employee("1", Role::ProfessorFundamentalII, Bond::Contrato, ""));
        assert_eq!(sheet.template, TemplateVariant::V5);
        // 2024-10-05 is a Saturday
        let saturday = &sheet.days[4];
        for column in columns(TemplateVariant::V5).iter().filter(|c| c.kind == CellKind::Class) {
            assert_eq!(cell_text(column, saturday, false), "SÁBADO");
        }
        let day = &columns(TemplateVariant::V5)[0];
        assert_eq!(cell_text(day, saturday, false), "05 Sáb");

        let mut record = saturday.clone();
        record.entry_time_1 = Some("08:00".to_string());
        let entry = col("Entrada", 10.0, CellKind::Entry1);
        let exit = col("Saída", 10.0, CellKind::Exit1);
        assert_eq!(cell_text(&entry, &record, true), "08:00");
        assert_eq!(cell_text(&exit, &record, true), "-");
        assert_eq!(cell_text(&exit, &record, false), "");
    }

    fn row_for(template: TemplateVariant, record: &DayRecord) -> Vec<String> {
        columns(template).iter().map(|c| cell_text(c, record, false)).collect()
    }

    #[test]
    fn test_every_punch_is_printed() {
        let sheet = timesheet(employee("1", Role::Asg, Bond::Efetivo, "ASG"));
        // 2024-10-01 is a Tuesday
        let mut record = sheet.days[0].clone();
        record.entry_time_1 = Some("08:00".to_string());
        record.exit_time_1 = Some("12:00".to_string());

        for template in [
            TemplateVariant::V1,
            TemplateVariant::V2,
            TemplateVariant::V3,
            TemplateVariant::V4,
            TemplateVariant::V6,
        ] {
            let row = row_for(template, &record);
            assert!(row.iter().any(|t| t == "08:00"), "{} lost entry_time_1: {:?}", template, row);
            assert!(row.iter().any(|t| t == "12:00"), "{} lost exit_time_1: {:?}", template, row);
        }

        record.entry_time_2 = Some("18:00".to_string());
        record.exit_time_2 = Some("20:00".to_string());
        for template in [
            TemplateVariant::V1,
            TemplateVariant::V2,
            TemplateVariant::V3,
            TemplateVariant::V4,
        ] {
            let row = row_for(template, &record);
            assert!(row.iter().any(|t| t == "18:00"), "{} lost entry_time_2: {:?}", template, row);
            assert!(row.iter().any(|t| t == "20:00"), "{} lost exit_time_2: {:?}", template, row);
        }
    }

    #[test]
    fn test_column_widths_fit_the_table() {
        for template in [
            TemplateVariant::V1,
            TemplateVariant::V2,
            TemplateVariant::V3,
            TemplateVariant::V4,
            TemplateVariant::V5,
            TemplateVariant::V6,
        ] {
            let total: f64 = columns(template).iter().map(|c| c.width).sum();
            assert!((total - TABLE_WIDTH_MM).abs() < 1e-6, "{} is {}", template, total);
        }
    }

    #[test]
    fn test_missing_font_file() {
        let missing = Path::new("/nonexistent/font.ttf");
        assert!(matches!(
            PdfOptions::load(Some(missing), None),
            Err(TimesheetError::Io(_))
        ));
    }
}
