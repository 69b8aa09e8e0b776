use serde::Serialize;

use crate::currency::{format_number, primary_language, CurrencyFormatter};
use crate::dates::{LocalDay, MonthRef};
use crate::domain::{DatedRecord, ExpenseRecord, WorkDayRecord};
use crate::errors::Result;

use super::summary_service::{MonthAggregator, MonthSummary};

/// Label/value pair already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: LocalDay,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub amount: f64,
    pub formatted_amount: String,
}

/// Everything the PDF summary prints for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub title: String,
    pub locale: String,
    pub month: MonthRef,
    pub summary: MonthSummary,
    pub summary_lines: Vec<ReportLine>,
    pub work_rows: Vec<ReportRow>,
    pub expense_rows: Vec<ReportRow>,
    pub category_lines: Vec<ReportLine>,
}

struct Labels {
    title: &'static str,
    worked_days: &'static str,
    work_rate: &'static str,
    records: &'static str,
    earned: &'static str,
    spent: &'static str,
    balance: &'static str,
    average: &'static str,
    work_section: &'static str,
    expense_section: &'static str,
    category_section: &'static str,
    uncategorized: &'static str,
    empty: &'static str,
}

const ES_LABELS: Labels = Labels {
    title: "Resumen",
    worked_days: "Días trabajados",
    work_rate: "Tasa de trabajo",
    records: "Registros",
    earned: "Total ganado",
    spent: "Total gastado",
    balance: "Balance",
    average: "Media por día trabajado",
    work_section: "Días trabajados",
    expense_section: "Gastos",
    category_section: "Gastos por categoría",
    uncategorized: "Sin categoría",
    empty: "Sin registros",
};

const EN_LABELS: Labels = Labels {
    title: "Summary",
    worked_days: "Days worked",
    work_rate: "Work rate",
    records: "Records",
    earned: "Total earned",
    spent: "Total spent",
    balance: "Balance",
    average: "Average per worked day",
    work_section: "Days worked",
    expense_section: "Expenses",
    category_section: "Expenses by category",
    uncategorized: "Uncategorized",
    empty: "No records",
};

fn labels_for(locale: &str) -> &'static Labels {
    if primary_language(locale) == "es" {
        &ES_LABELS
    } else {
        &EN_LABELS
    }
}

pub struct ReportService;

impl ReportService {
    pub fn monthly(
        work_days: &[WorkDayRecord],
        expenses: &[ExpenseRecord],
        month: MonthRef,
        formatter: &CurrencyFormatter,
    ) -> MonthlyReport {
        let locale = formatter.locale();
        let labels = labels_for(&locale.language_tag);
        let summary = MonthAggregator::aggregate(work_days, expenses, month);

        let line = |label: &str, value: String| ReportLine {
            label: label.to_string(),
            value,
        };
        let summary_lines = vec![
            line(
                labels.worked_days,
                format!("{} / {}", summary.worked_days, summary.total_days_in_month),
            ),
            line(
                labels.work_rate,
                format!("{}%", format_number(locale, summary.work_rate_percent, 1)),
            ),
            line(labels.records, summary.work_records.to_string()),
            line(labels.earned, formatter.format(summary.total_earned)),
            line(labels.spent, formatter.format(summary.total_spent)),
            line(labels.balance, formatter.format(summary.balance)),
            line(labels.average, formatter.format(summary.average_per_worked_day)),
        ];

        let work_rows = rows(
            MonthAggregator::in_month(work_days, month).map(|record| (record, None)),
            formatter,
        );
        let expense_rows = rows(
            MonthAggregator::in_month(expenses, month)
                .map(|record| (record, record.category.clone())),
            formatter,
        );
        let category_lines = summary
            .expenses_by_category
            .iter()
            .map(|total| {
                line(
                    total.category.as_deref().unwrap_or(labels.uncategorized),
                    formatter.format(total.total),
                )
            })
            .collect();

        MonthlyReport {
            title: format!("{} {}", labels.title, month.label(&locale.language_tag)),
            locale: locale.language_tag.clone(),
            month,
            summary,
            summary_lines,
            work_rows,
            expense_rows,
            category_lines,
        }
    }
}

fn rows<'a, R, I>(records: I, formatter: &CurrencyFormatter) -> Vec<ReportRow>
where
    R: DatedRecord + 'a,
    I: Iterator<Item = (&'a R, Option<String>)>,
{
    let mut rows: Vec<ReportRow> = records
        .map(|(record, category)| ReportRow {
            date: record.day(),
            description: record.description().unwrap_or("-").to_string(),
            category,
            amount: record.amount(),
            formatted_amount: formatter.format(record.amount()),
        })
        .collect();
    rows.sort_by_key(|row| row.date);
    rows
}

impl MonthlyReport {
    /// Plain-text rendering, one section per block.
    pub fn render_text(&self) -> String {
        let labels = labels_for(&self.locale);
        let mut lines = vec![
            self.title.clone(),
            "=".repeat(self.title.chars().count()),
        ];
        lines.extend(
            self.summary_lines
                .iter()
                .map(|line| format!("{}: {}", line.label, line.value)),
        );
        push_rows(&mut lines, labels.work_section, &self.work_rows, labels.empty);
        push_rows(&mut lines, labels.expense_section, &self.expense_rows, labels.empty);
        if !self.category_lines.is_empty() {
            lines.push(String::new());
            lines.push(labels.category_section.to_string());
            lines.extend(
                self.category_lines
                    .iter()
                    .map(|line| format!("  {}: {}", line.label, line.value)),
            );
        }
        let mut rendered = lines.join("\n");
        rendered.push('\n');
        rendered
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn push_rows(lines: &mut Vec<String>, heading: &str, rows: &[ReportRow], empty: &str) {
    lines.push(String::new());
    lines.push(heading.to_string());
    if rows.is_empty() {
        lines.push(format!("  {empty}"));
        return;
    }
    lines.extend(rows.iter().map(|row| {
        let description = match &row.category {
            Some(category) => format!("{} [{}]", row.description, category),
            None => row.description.clone(),
        };
        format!("  {}  {}  {}", row.date, description, row.formatted_amount)
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> LocalDay {
        LocalDay::from_ymd(2024, 3, d).unwrap()
    }

    fn sample() -> MonthlyReport {
        let work = [
            WorkDayRecord::new(day(12), 80.0, Some("Reparto".into())),
            WorkDayRecord::new(day(5), 100.0, None),
            WorkDayRecord::new(LocalDay::from_ymd(2024, 4, 1).unwrap(), 999.0, None),
        ];
        let expenses = [ExpenseRecord::new(day(6), 12.5, Some("Comida".into()), "Menú")];
        ReportService::monthly(
            &work,
            &expenses,
            MonthRef::new(2024, 3).unwrap(),
            &CurrencyFormatter::for_locale("es-ES"),
        )
    }

    #[test]
    fn rows_are_chronological_and_scoped_to_the_month() {
        let report = sample();
        assert_eq!(report.title, "Resumen marzo 2024");
        let dates: Vec<_> = report.work_rows.iter().map(|r| r.date.key()).collect();
        assert_eq!(dates, ["2024-03-05", "2024-03-12"]);
        assert_eq!(report.work_rows[0].description, "-");
        assert_eq!(report.expense_rows[0].category.as_deref(), Some("Comida"));
    }

    #[test]
    fn summary_lines_are_formatted_for_the_locale() {
        let report = sample();
        let value = |label: &str| {
            report
                .summary_lines
                .iter()
                .find(|line| line.label == label)
                .map(|line| line.value.clone())
                .unwrap()
        };
        assert_eq!(value("Días trabajados"), "2 / 31");
        assert_eq!(value("Tasa de trabajo"), "6,5%");
        assert_eq!(value("Total ganado"), "180,00\u{a0}€");
        assert_eq!(value("Balance"), "167,50\u{a0}€");
    }

    #[test]
    fn json_export_carries_the_summary() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["month"], "2024-03");
        assert_eq!(value["summary"]["worked_days"], 2);
        assert_eq!(value["work_rows"][1]["date"], "2024-03-12");
    }

    #[test]
    fn text_rendering_lists_every_section() {
        let nb = '\u{a0}';
        let expected = format!(
            "Resumen marzo 2024\n\
             ==================\n\
             Días trabajados: 2 / 31\n\
             Tasa de trabajo: 6,5%\n\
             Registros: 2\n\
             Total ganado: 180,00{nb}€\n\
             Total gastado: 12,50{nb}€\n\
             Balance: 167,50{nb}€\n\
             Media por día trabajado: 90,00{nb}€\n\
             \n\
             Días trabajados\n  \
             2024-03-05  -  100,00{nb}€\n  \
             2024-03-12  Reparto  80,00{nb}€\n\
             \n\
             Gastos\n  \
             2024-03-06  Menú [Comida]  12,50{nb}€\n\
             \n\
             Gastos por categoría\n  \
             Comida: 12,50{nb}€\n"
        );
        assert_eq!(sample().render_text(), expected);
    }

    #[test]
    fn empty_sections_say_so() {
        let report = ReportService::monthly(
            &[],
            &[],
            MonthRef::new(2024, 2).unwrap(),
            &CurrencyFormatter::for_locale("en-US"),
        );
        let text = report.render_text();
        assert!(text.starts_with("Summary February 2024\n"));
        assert_eq!(text.matches("  No records\n").count(), 2);
        assert!(!text.contains("Expenses by category"));
        assert!(text.ends_with('\n'));
    }
}
