//! Receipt
//!
//! Terminal rendering of price calculations, unit quotes and the flash feed.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    pricing::{PriceCalculation, SimpleQuote},
    promotions::{FlashOffer, PromotionEligibility, ScheduleInfo},
    schedule::format_clock,
};

const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Write the breakdown table and totals of a dynamic price calculation.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_calculation(
    mut out: impl io::Write,
    calculation: &PriceCalculation,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    let mut color_ops: Vec<(usize, usize, Color)> = Vec::new();

    builder.push_record(["Step", "Amount"]);

    for (idx, line) in calculation.breakdown.iter().enumerate() {
        builder.push_record([line.description.clone(), format!("{}", line.amount)]);

        if line.amount.is_negative() {
            color_ops.push((idx + 1, 1, color_dark_green()));
        }
    }

    write_table(&mut out, builder, 1, color_ops)?;

    let total = format!("{}  ", calculation.final_price);
    let savings = format!("{}  ", calculation.total_savings);

    let mut lines = vec![
        (" \x1b[1mTotal:\x1b[0m".to_string(), format!("\x1b[1m{total}\x1b[0m")),
        (" Savings:".to_string(), savings),
    ];

    if let Some(promotion) = promotion_summary(&calculation.promotion) {
        lines.push((" Promotion:".to_string(), format!("{promotion}  ")));
    }

    write_summary(&mut out, &lines)?;

    if calculation.needs_configuration() {
        writeln!(
            out,
            " \x1b[33mNo pricing is configured for this offer.\x1b[0m"
        )
        .map_err(|_err| ReceiptError::IO)?;
    }

    Ok(())
}

/// Write a unit-based quote.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_quote(mut out: impl io::Write, quote: &SimpleQuote) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Option", "Unit", "Unit Price", "Amount"]);
    builder.push_record([
        quote.breakdown.description.clone(),
        quote.unit.to_string(),
        format!("{}", quote.unit_price),
        format!("{}", quote.breakdown.amount),
    ]);

    write_table(&mut out, builder, 2, Vec::new())?;

    write_summary(
        &mut out,
        &[(
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", quote.total),
        )],
    )
}

/// Write the live flash offers, labelling each offer through `offer_name`.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_feed<'n>(
    mut out: impl io::Write,
    offers: &[FlashOffer],
    offer_name: impl Fn(&FlashOffer) -> Option<&'n str>,
) -> Result<(), ReceiptError> {
    if offers.is_empty() {
        return writeln!(out, "\nNo promotions are live right now.\n")
            .map_err(|_err| ReceiptError::IO);
    }

    let mut builder = Builder::default();

    builder.push_record(["Offer", "Promotion", "Discount", "Ends", "Max"]);

    for offer in offers {
        builder.push_record([
            offer_name(offer).map_or_else(|| offer.offer.to_string(), str::to_string),
            offer.title.clone(),
            format!("-{}%", offer.discount_percentage.normalize()),
            format!(
                "{} {}",
                offer.ends_at.date(),
                format_clock(offer.ends_at.time())
            ),
            offer
                .max_participants
                .map_or_else(String::new, |max| max.to_string()),
        ]);
    }

    write_table(&mut out, builder, 2, Vec::new())?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

fn promotion_summary(eligibility: &PromotionEligibility) -> Option<String> {
    let promotion = eligibility.promotion.as_ref()?;

    let schedule = match &promotion.schedule {
        ScheduleInfo::Weekly {
            days,
            start_time,
            end_time,
        } => format!("{days} {start_time}-{end_time}"),
        ScheduleInfo::DateRange { starts_on, ends_on } => format!("{starts_on} to {ends_on}"),
    };

    Some(format!(
        "{} (-{}%, {schedule})",
        promotion.title,
        promotion.discount_percentage.normalize()
    ))
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    first_amount_column: usize,
    color_ops: Vec<(usize, usize, Color)>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(first_amount_column..), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, lines: &[(String, String)]) -> Result<(), ReceiptError> {
    let label_width = lines
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = lines
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in lines {
        write_summary_line(out, label, value, (label_width, value_width))?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Dims runs of box-drawing characters (U+2500..U+257F).
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut dimmed = false;

    for ch in table.chars() {
        let border = ('\u{2500}'..='\u{257F}').contains(&ch);

        if border != dimmed {
            out.push_str(if border { DIM } else { RESET });
            dimmed = border;
        }

        out.push(ch);
    }

    if dimmed {
        out.push_str(RESET);
    }

    out
}

/// Character count ignoring ANSI escape sequences.
fn visible_width(s: &str) -> usize {
    s.chars()
        .scan(false, |escaped, ch| {
            let visible = if *escaped {
                *escaped = !ch.is_ascii_alphabetic();
                false
            } else {
                *escaped = ch == '\x1b';
                !*escaped
            };

            Some(visible)
        })
        .filter(|visible| *visible)
        .count()
}

/// Right-aligns `label` and `value` in columns of `(label, value)` widths.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    widths: (usize, usize),
) -> Result<(), ReceiptError> {
    let pad = |text: &str, width: usize| " ".repeat(width.saturating_sub(visible_width(text)));

    writeln!(
        out,
        "{}{label}  {}{value}",
        pad(label, widths.0),
        pad(value, widths.1)
    )
    .map_err(|_err| ReceiptError::IO)
}

fn color_dark_green() -> Color {
    Color::new("\x1b[32m", "\x1b[0m")
}
