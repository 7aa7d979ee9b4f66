use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::ImportError;
use crate::models::{Roster, StudentRecord};

/// Parses a comma separated grade sheet.
///
/// The first line is the header (`Name,<Subject1>,<Subject2>,...`). Rows whose
/// field count differs from the header are skipped, as are grade tokens that
/// are not numbers. An empty roster is returned as-is; rejecting it is up to
/// the caller.
pub fn parse(raw_text: &str) -> Result<Roster, ImportError> {
    let text = raw_text.trim();
    if text.lines().count() < 2 {
        return Err(ImportError::Format);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers = match records.next() {
        Some(header) => header.map_err(|_| ImportError::Format)?,
        None => return Err(ImportError::Format),
    };

    let mut roster = Roster::new();
    for result in records {
        // Reading from an in-memory `&str` only fails on malformed input.
        let row = result.map_err(|_| ImportError::Format)?;
        if row.len() != headers.len() {
            debug!(
                line = line_of(&row),
                fields = row.len(),
                expected = headers.len(),
                "skipping row with wrong field count"
            );
            continue;
        }
        roster.push(parse_row(&headers, &row));
    }

    Ok(roster)
}

fn parse_row(headers: &StringRecord, row: &StringRecord) -> StudentRecord {
    let mut student = StudentRecord::new(row.get(0).unwrap_or_default());
    let mut total = 0.0;
    let mut count = 0usize;

    // A repeated subject column overwrites the stored grade but still counts
    // towards the row average.
    for (subject, token) in headers.iter().zip(row.iter()).skip(1) {
        match parse_grade(token) {
            Some(grade) => {
                student.set_grade(subject, grade);
                total += grade;
                count += 1;
            }
            None => debug!(
                line = line_of(row),
                subject,
                token,
                "skipping non-numeric grade"
            ),
        }
    }

    student.average = Some(if count == 0 { 0.0 } else { total / count as f64 });
    student
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|pos| pos.line()).unwrap_or(0)
}

/// Reads the longest leading decimal number of `token`, so `"15/20"` gives 15.
/// Returns `None` when there is no numeric prefix or the value is not finite.
pub fn parse_grade(token: &str) -> Option<f64> {
    let bytes = token.trim().as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    let prefix = std::str::from_utf8(&bytes[..end]).ok()?;
    prefix.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
