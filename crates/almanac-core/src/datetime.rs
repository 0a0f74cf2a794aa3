use anyhow::{Context, anyhow};
use chrono::{Duration, NaiveDate};
use regex::Regex;

/// Parses a day expression into a calendar date. Accepted forms:
/// `today`, `tomorrow`, `yesterday`, `+Nd`/`-Nd` relative to today, and
/// literal `YYYY-MM-DD`.
#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_day_expr(input: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let token = input.trim();
    let lower = token.to_ascii_lowercase();

    match lower.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)d$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

    if let Some(caps) = rel_re.captures(token) {
        let sign = caps
            .name("sign")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative sign"))?;
        let num: i64 = caps
            .name("num")
            .map(|m| m.as_str())
            .ok_or_else(|| anyhow!("missing relative amount"))?
            .parse()
            .context("invalid relative number")?;

        let duration = Duration::days(num);
        return Ok(if sign == "-" {
            today - duration
        } else {
            today + duration
        });
    }

    if let Ok(date) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Ok(date);
    }

    Err(anyhow!("unrecognized day expression: {input}")).with_context(|| {
        "supported formats: today/tomorrow/yesterday, +Nd/-Nd, YYYY-MM-DD"
    })
}

/// Parses a `YYYY-MM` month selector for the one-shot calendar command.
pub fn parse_year_month(input: &str) -> anyhow::Result<(i32, u32)> {
    let token = input.trim();
    let (year_raw, month_raw) = token
        .split_once('-')
        .ok_or_else(|| anyhow!("expected YYYY-MM, got: {input}"))?;

    let year: i32 = year_raw.parse().context("invalid year in YYYY-MM")?;
    let month: u32 = month_raw.parse().context("invalid month in YYYY-MM")?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("month out of range in {input}: {month}"));
    }

    Ok((year, month))
}


pub mod day_date_serde {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(serde::de::Error::custom)
    }
}
