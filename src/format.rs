// asv-collect - Benchmark result collection tool
// Copyright (c) 2025 Oliver Seifert
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Console formatting of benchmark values and tables.

use crate::benchmarks::{Benchmark, cartesian_product};
use crate::results::Measurement;

const TIME_UNITS: &[(&str, f64)] = &[
    ("ns", 1e-9),
    ("μs", 1e-6),
    ("ms", 1e-3),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
    ("d", 86_400.0),
    ("w", 604_800.0),
    ("y", 31_449_600.0),
    ("C", 3_144_960_000.0),
];

const SIZE_PREFIXES: &[&str] = &["", "k", "M", "G", "T", "P", "E", "Z", "Y"];

/// Format with `digits` significant digits, dropping trailing zeros
/// (switches to exponent notation for very small or large magnitudes).
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = digits.max(1);

    // Round first so that e.g. 999.6 moves to the next exponent
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

pub fn human_time(seconds: f64) -> String {
    if seconds == 0.0 {
        return "0".to_string();
    }
    let magnitude = seconds.abs();
    let (suffix, factor) = TIME_UNITS
        .iter()
        .rev()
        .find(|(_, factor)| magnitude >= *factor)
        .copied()
        .unwrap_or(TIME_UNITS[0]);
    format!("{}{}", format_significant(seconds / factor, 3), suffix)
}

pub fn human_file_size(bytes: f64) -> String {
    let magnitude = bytes.abs();
    let mut index = 0;
    while index + 1 < SIZE_PREFIXES.len() && magnitude >= 1000f64.powi(index as i32 + 1) {
        index += 1;
    }
    format!(
        "{}{}",
        format_significant(bytes / 1000f64.powi(index as i32), 3),
        SIZE_PREFIXES[index]
    )
}

/// Render one measurement in the benchmark's unit.
pub fn human_value(measurement: Measurement, unit: &str) -> String {
    match measurement {
        Measurement::Missing => "n/a".to_string(),
        Measurement::Failed => "failed".to_string(),
        Measurement::Value(v) if v.is_nan() => "n/a".to_string(),
        Measurement::Value(v) => match unit {
            "seconds" => human_time(v),
            "bytes" => human_file_size(v),
            _ => v.to_string(),
        },
    }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Spanning header over the columns from `span_start` on.
pub struct TopHeader<'a> {
    pub span_start: usize,
    pub text: &'a str,
}

/// Format rows as a `=`-ruled text table; the first `num_headers` rows are headers.
pub fn format_text_table(
    rows: &[Vec<String>],
    num_headers: usize,
    top_header: Option<TopHeader<'_>>,
) -> Vec<String> {
    let num_items = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..num_items)
        .map(|j| {
            rows.iter()
                .map(|row| row.get(j).map(|s| s.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0)
                + 2
        })
        .collect();

    let render = |row: &Vec<String>| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(j, w)| center(row.get(j).map(String::as_str).unwrap_or(""), *w))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };
    let dashes = |ws: &[usize]| -> String {
        ws.iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-")
    };
    let separator = widths
        .iter()
        .map(|w| "=".repeat(*w))
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = Vec::new();
    if let Some(TopHeader { span_start, text }) = top_header {
        let span_start = span_start.min(widths.len());
        let left = dashes(&widths[..span_start]);
        let right = dashes(&widths[span_start..]);
        if !left.is_empty() && !right.is_empty() {
            let right_len = right.chars().count();
            lines.push(format!(
                "--{}{}",
                " ".repeat(left.len().saturating_sub(1)),
                center(text, right_len)
            ));
            lines.push(format!("{} {}", left, right));
        } else {
            lines.push(center(text, separator.chars().count()).trim_end().to_string());
            lines.push(format!("{}{}", left, right));
        }
    }

    let num_headers = num_headers.min(rows.len());
    lines.extend(rows[..num_headers].iter().map(render));
    lines.push(separator.clone());
    lines.extend(rows[num_headers..].iter().map(render));
    lines.push(separator);
    lines
}

/// Usable width for result tables: three quarters of the terminal (`COLUMNS`, else 80).
pub fn default_max_width() -> usize {
    let columns = std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse::<usize>().ok())
        .filter(|c| *c > 0)
        .unwrap_or(80);
    columns * 3 / 4
}

fn table_for(values: &[Measurement], benchmark: &Benchmark, num_column_params: usize) -> Vec<String> {
    let params = &benchmark.params;
    let split = params.len() - num_column_params;
    let (row_params, column_params) = params.split_at(split);
    let param_name = |i: usize| {
        benchmark
            .param_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("param{}", i + 1))
    };

    let mut header: Vec<String> = (0..split).map(param_name).collect();
    let column_items = if column_params.is_empty() {
        header.push(String::new());
        1
    } else {
        let column_combinations = cartesian_product(column_params);
        header.extend(column_combinations.iter().map(|values| values.join(" / ")));
        column_combinations.len()
    };

    let mut rows = vec![header];
    for (j, labels) in cartesian_product(row_params).into_iter().enumerate() {
        let mut row = labels;
        row.extend((0..column_items).map(|k| {
            let measurement = values
                .get(j * column_items + k)
                .copied()
                .unwrap_or(Measurement::Missing);
            human_value(measurement, &benchmark.unit)
        }));
        rows.push(row);
    }

    let column_names = (split..params.len())
        .map(param_name)
        .collect::<Vec<_>>()
        .join(" / ");
    let top_header = if column_params.is_empty() {
        None
    } else {
        Some(TopHeader {
            span_start: split,
            text: &column_names,
        })
    };
    format_text_table(&rows, 1, top_header)
}

/// Display lines for one benchmark's measurements, one per parameter combination.
///
/// Trailing parameters are folded into columns while the table stays
/// narrower than `max_width`.
pub fn format_benchmark_result(
    values: &[Measurement],
    benchmark: &Benchmark,
    max_width: usize,
) -> Vec<String> {
    if benchmark.params.is_empty() {
        let value = values.first().copied().unwrap_or(Measurement::Missing);
        return vec![human_value(value, &benchmark.unit)];
    }

    let mut lines = table_for(values, benchmark, 0);
    for num_column_params in 1..benchmark.params.len() {
        let candidate = table_for(values, benchmark, num_column_params);
        let width = candidate
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        if width < max_width {
            lines = candidate;
        } else {
            break;
        }
    }
    lines
}
