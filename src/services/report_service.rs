use crate::error::Result;
use crate::models::application::ApplicationStatus;
use crate::models::company::Company;
use crate::models::job::Job;
use crate::models::stats::AdminStats;
use crate::services::backend_service::BackendClient;
use crate::utils::retry::retry_with_backoff;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::*;
use std::collections::HashMap;
use std::time::Duration;

pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ReportData {
    pub stats: AdminStats,
    pub jobs: Vec<Job>,
    pub companies: Vec<Company>,
    pub generated_at: DateTime<Utc>,
}

pub struct ReportService {
    backend: BackendClient,
    max_attempts: u32,
}

impl ReportService {
    pub fn new(backend: BackendClient, max_attempts: u32) -> Self {
        Self {
            backend,
            max_attempts,
        }
    }

    /// Fetches the three report sources in parallel, each retried with
    /// backoff. Fails if any of them keeps failing.
    pub async fn collect(&self) -> Result<ReportData> {
        let backend = &self.backend;
        let attempts = self.max_attempts;
        let (stats, jobs, companies) = tokio::try_join!(
            retry_with_backoff(attempts, RETRY_BASE_DELAY, move |_| async move {
                backend.get::<AdminStats>("admin/stats").await.into_result()
            }),
            retry_with_backoff(attempts, RETRY_BASE_DELAY, move |_| async move {
                backend.get::<Vec<Job>>("jobs").await.into_result()
            }),
            retry_with_backoff(attempts, RETRY_BASE_DELAY, move |_| async move {
                backend.get::<Vec<Company>>("companies").await.into_result()
            }),
        )?;
        Ok(ReportData {
            stats,
            jobs,
            companies,
            generated_at: Utc::now(),
        })
    }

    pub async fn export_xlsx(&self) -> Result<Vec<u8>> {
        let data = self.collect().await?;
        let bytes = build_workbook(&data)?;
        tracing::info!(
            jobs = data.jobs.len(),
            companies = data.companies.len(),
            bytes = bytes.len(),
            "admin report exported"
        );
        Ok(bytes)
    }
}

pub fn report_filename(at: DateTime<Utc>) -> String {
    format!("ficct_talent_report_{}.xlsx", at.format("%Y%m%d_%H%M"))
}

struct Palette {
    title: Format,
    header: Format,
    cell: Format,
    number: Format,
}

impl Palette {
    fn new() -> Self {
        let border = Color::RGB(0xE2E8F0);
        Self {
            title: Format::new()
                .set_font_size(16)
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x1E293B))
                .set_align(FormatAlign::VerticalCenter),
            header: Format::new()
                .set_bold()
                .set_font_size(10)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(0x0F172A))
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(border),
            cell: Format::new()
                .set_font_size(10)
                .set_border(FormatBorder::Thin)
                .set_border_color(border),
            number: Format::new()
                .set_font_size(10)
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(border),
        }
    }
}

pub fn build_workbook(data: &ReportData) -> Result<Vec<u8>> {
    let palette = Palette::new();
    let mut workbook = Workbook::new();

    write_summary(&mut workbook, data, &palette)?;
    write_applications(&mut workbook, &data.stats, &palette)?;
    write_monthly(&mut workbook, &data.stats, &palette)?;
    write_jobs(&mut workbook, data, &palette)?;

    Ok(workbook.save_to_buffer()?)
}

fn header_row(sheet: &mut Worksheet, row: u32, columns: &[(&str, f64)], fmt: &Format) -> Result<()> {
    for (i, (name, width)) in columns.iter().enumerate() {
        sheet.set_column_width(i as u16, *width)?;
        sheet.write_string_with_format(row, i as u16, *name, fmt)?;
    }
    Ok(())
}

fn write_summary(workbook: &mut Workbook, data: &ReportData, p: &Palette) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Resumen")?;
    sheet.set_row_height(0, 32)?;
    sheet.merge_range(0, 0, 0, 1, "Reporte FICCT Talent", &p.title)?;
    let generated = data.generated_at.format("%d.%m.%Y %H:%M UTC").to_string();
    sheet.write_string(1, 0, format!("Generado: {}", generated))?;

    header_row(sheet, 3, &[("Indicador", 32.0), ("Valor", 14.0)], &p.header)?;
    let s = &data.stats;
    let rows: [(&str, i64); 5] = [
        ("Estudiantes registrados", s.total_students),
        ("Empresas registradas", s.total_companies),
        ("Ofertas publicadas", s.total_jobs),
        ("Ofertas activas", s.active_jobs),
        ("Postulaciones", s.total_applications),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = 4 + i as u32;
        sheet.write_string_with_format(row, 0, *label, &p.cell)?;
        sheet.write_number_with_format(row, 1, *value as f64, &p.number)?;
    }
    Ok(())
}

fn write_applications(workbook: &mut Workbook, stats: &AdminStats, p: &Palette) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Postulaciones")?;
    header_row(sheet, 0, &[("Estado", 24.0), ("Cantidad", 12.0)], &p.header)?;

    // known statuses first in pipeline order, then anything else the backend reports
    let mut rows: Vec<(String, i64)> = ApplicationStatus::ALL
        .iter()
        .map(|st| {
            (
                st.label().to_string(),
                stats.applications_by_status.get(st.as_str()).copied().unwrap_or(0),
            )
        })
        .collect();
    rows.extend(
        stats
            .applications_by_status
            .iter()
            .filter(|(k, _)| !ApplicationStatus::ALL.iter().any(|st| st.as_str() == k.as_str()))
            .map(|(k, v)| (k.clone(), *v)),
    );

    for (i, (label, count)) in rows.iter().enumerate() {
        let row = 1 + i as u32;
        sheet.write_string_with_format(row, 0, label, &p.cell)?;
        sheet.write_number_with_format(row, 1, *count as f64, &p.number)?;
    }
    Ok(())
}

fn write_monthly(workbook: &mut Workbook, stats: &AdminStats, p: &Palette) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Mensual")?;
    header_row(
        sheet,
        0,
        &[("Mes", 14.0), ("Postulaciones", 16.0), ("Contrataciones", 16.0)],
        &p.header,
    )?;
    for (i, point) in stats.monthly.iter().enumerate() {
        let row = 1 + i as u32;
        sheet.write_string_with_format(row, 0, &point.month, &p.cell)?;
        sheet.write_number_with_format(row, 1, point.applications as f64, &p.number)?;
        sheet.write_number_with_format(row, 2, point.hires as f64, &p.number)?;
    }

    if stats.monthly.is_empty() {
        return Ok(());
    }
    let last = stats.monthly.len() as u32;
    let mut chart = Chart::new(ChartType::Column);
    chart.title().set_name("Actividad mensual");
    chart
        .add_series()
        .set_name("Postulaciones")
        .set_categories(("Mensual", 1, 0, last, 0))
        .set_values(("Mensual", 1, 1, last, 1));
    chart
        .add_series()
        .set_name("Contrataciones")
        .set_categories(("Mensual", 1, 0, last, 0))
        .set_values(("Mensual", 1, 2, last, 2));
    sheet.insert_chart(1, 4, &chart)?;
    Ok(())
}

fn write_jobs(workbook: &mut Workbook, data: &ReportData, p: &Palette) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Ofertas")?;
    header_row(
        sheet,
        0,
        &[
            ("Título", 36.0),
            ("Empresa", 26.0),
            ("Ubicación", 20.0),
            ("Tipo", 14.0),
            ("Activa", 10.0),
            ("Postulaciones", 14.0),
        ],
        &p.header,
    )?;

    let company_names: HashMap<&str, &str> = data
        .companies
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    for (i, job) in data.jobs.iter().enumerate() {
        let row = 1 + i as u32;
        let company = job
            .company_name
            .as_deref()
            .or_else(|| job.company_id.as_deref().and_then(|id| company_names.get(id).copied()))
            .unwrap_or("—");
        sheet.write_string_with_format(row, 0, &job.title, &p.cell)?;
        sheet.write_string_with_format(row, 1, company, &p.cell)?;
        sheet.write_string_with_format(row, 2, job.location.as_deref().unwrap_or("—"), &p.cell)?;
        sheet.write_string_with_format(row, 3, job.job_type.as_deref().unwrap_or("—"), &p.cell)?;
        sheet.write_string_with_format(row, 4, if job.is_active { "Sí" } else { "No" }, &p.number)?;
        sheet.write_number_with_format(
            row,
            5,
            job.applications_count.unwrap_or(0) as f64,
            &p.number,
        )?;
    }
    Ok(())
}
