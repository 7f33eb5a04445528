//! Extract info from a path following the dataset naming convention.
//!
//! Dataset files are named `<name>_p<period>[_p<period2>]_v<version>.<ext>`
//! and stored under folders named after the dataset state (`kildedata`,
//! `inndata`, `klargjorte_data`, `statistikk`, `utdata`). Everything here
//! is best-effort pre-fill: unparseable tokens yield `None`, never an
//! error.

use std::sync::LazyLock;

use chrono::{Days, Months, NaiveDate, Weekday};
use datadoc_model::DataSetState;
use regex::Regex;

macro_rules! period_regex {
    ($name:ident, $pattern:literal) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            // Pattern is a compile-time literal, construction cannot fail.
            #[allow(clippy::expect_used)]
            Regex::new($pattern).expect("valid regex literal")
        });
    };
}

period_regex!(ISO_YEAR, r"^\d{4}$");
period_regex!(ISO_YEAR_MONTH, r"^\d{4}\-\d{2}$");
period_regex!(ISO_YEAR_MONTH_DAY, r"^\d{4}\-\d{2}\-\d{2}$");
period_regex!(ISO_YEAR_WEEK, r"^\d{4}\-?W\d{2}$");
period_regex!(HALF_YEAR, r"^\d{4}H\d$");
period_regex!(TRIMESTER, r"^\d{4}T\d$");
period_regex!(QUARTER, r"^\d{4}Q\d$");
period_regex!(BIMESTER, r"^\d{4}B\d$");
period_regex!(VERSION_TOKEN, r"^v\d+$");

/// A recognized period token format.
///
/// Each format knows how to compute the floor (start of period) and
/// ceiling (end of period) date of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFormat {
    IsoYear,
    IsoYearMonth,
    IsoYearMonthDay,
    IsoWeek,
    /// `YYYYHh`, h in 1..=2
    HalfYear,
    /// `YYYYTt`, t in 1..=3 (4-month blocks)
    Trimester,
    /// `YYYYQq`, q in 1..=4
    Quarter,
    /// `YYYYBb`, b in 1..=6 (2-month blocks)
    Bimester,
}

impl PeriodFormat {
    const ALL: [PeriodFormat; 8] = [
        PeriodFormat::IsoYear,
        PeriodFormat::IsoYearMonth,
        PeriodFormat::IsoYearMonthDay,
        PeriodFormat::IsoWeek,
        PeriodFormat::HalfYear,
        PeriodFormat::Trimester,
        PeriodFormat::Quarter,
        PeriodFormat::Bimester,
    ];

    fn regex(&self) -> &Regex {
        match self {
            PeriodFormat::IsoYear => &ISO_YEAR,
            PeriodFormat::IsoYearMonth => &ISO_YEAR_MONTH,
            PeriodFormat::IsoYearMonthDay => &ISO_YEAR_MONTH_DAY,
            PeriodFormat::IsoWeek => &ISO_YEAR_WEEK,
            PeriodFormat::HalfYear => &HALF_YEAR,
            PeriodFormat::Trimester => &TRIMESTER,
            PeriodFormat::Quarter => &QUARTER,
            PeriodFormat::Bimester => &BIMESTER,
        }
    }

    /// Categorize a period string into one of the supported formats
    pub fn categorize(period: &str) -> Option<PeriodFormat> {
        PeriodFormat::ALL
            .into_iter()
            .find(|format| format.regex().is_match(period))
    }

    /// First and last month (1-based) of a month-block period, or None for
    /// an index outside the format's range
    fn month_block(&self, index: u32) -> Option<(u32, u32)> {
        match self {
            PeriodFormat::HalfYear if (1..=2).contains(&index) => {
                Some((index * 6 - 5, index * 6))
            }
            PeriodFormat::Trimester if (1..=3).contains(&index) => {
                Some((index * 4 - 3, index * 4))
            }
            PeriodFormat::Quarter if (1..=4).contains(&index) => {
                Some((index * 3 - 2, index * 3))
            }
            PeriodFormat::Bimester if (1..=6).contains(&index) => {
                Some((index * 2 - 1, index * 2))
            }
            _ => None,
        }
    }

    fn parse_year_and_index(period: &str) -> Option<(i32, u32)> {
        let year: i32 = period.get(..4)?.parse().ok()?;
        let index: u32 = period.get(5..)?.parse().ok()?;
        Some((year, index))
    }

    /// Return the first date of the period, or None if the token is not a
    /// valid instance of this format
    pub fn floor(&self, period: &str) -> Option<NaiveDate> {
        match self {
            PeriodFormat::IsoYear => {
                let year: i32 = period.parse().ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)
            }
            PeriodFormat::IsoYearMonth => {
                let (year, month) = parse_year_month(period)?;
                NaiveDate::from_ymd_opt(year, month, 1)
            }
            PeriodFormat::IsoYearMonthDay => {
                NaiveDate::parse_from_str(period, "%Y-%m-%d").ok()
            }
            PeriodFormat::IsoWeek => {
                let (year, week) = parse_year_week(period)?;
                NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            }
            _ => {
                let (year, index) = Self::parse_year_and_index(period)?;
                let (start_month, _) = self.month_block(index)?;
                NaiveDate::from_ymd_opt(year, start_month, 1)
            }
        }
    }

    /// Return the last date of the period, or None if the token is not a
    /// valid instance of this format
    pub fn ceil(&self, period: &str) -> Option<NaiveDate> {
        match self {
            PeriodFormat::IsoYear => {
                let year: i32 = period.parse().ok()?;
                NaiveDate::from_ymd_opt(year, 12, 31)
            }
            PeriodFormat::IsoYearMonth => {
                let (year, month) = parse_year_month(period)?;
                last_day_of_month(year, month)
            }
            PeriodFormat::IsoYearMonthDay => {
                NaiveDate::parse_from_str(period, "%Y-%m-%d").ok()
            }
            PeriodFormat::IsoWeek => {
                let (year, week) = parse_year_week(period)?;
                NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)
            }
            _ => {
                let (year, index) = Self::parse_year_and_index(period)?;
                let (_, end_month) = self.month_block(index)?;
                last_day_of_month(year, end_month)
            }
        }
    }
}

fn parse_year_month(period: &str) -> Option<(i32, u32)> {
    let (year, month) = period.split_once('-')?;
    Some((year.parse().ok()?, month.parse().ok()?))
}

fn parse_year_week(period: &str) -> Option<(i32, u32)> {
    let normalized = period.replace('-', "");
    let (year, week) = normalized.split_once('W')?;
    Some((year.parse().ok()?, week.parse().ok()?))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))
}

/// Norwegian folder names for each dataset state, as mandated by the
/// storage naming standard.
fn state_folder_variants(state: DataSetState) -> &'static [&'static str] {
    match state {
        DataSetState::SourceData => &["kildedata"],
        DataSetState::InputData => &["inndata"],
        DataSetState::ProcessedData => &["klargjorte_data", "klargjorte-data"],
        DataSetState::Statistics => &["statistikk"],
        DataSetState::OutputData => &["utdata"],
    }
}

/// Decomposed information about a dataset path.
#[derive(Debug, Clone)]
pub struct DatasetPathInfo {
    path_parts: Vec<String>,
    name_sections: Vec<String>,
    period_strings: Vec<String>,
}

impl DatasetPathInfo {
    /// Digest the path so that it's ready for further parsing
    pub fn new(dataset_path: &str) -> Self {
        let without_scheme = match dataset_path.split_once("://") {
            Some((_, rest)) => rest,
            None => dataset_path,
        };
        let path_parts: Vec<String> = without_scheme
            .split('/')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();

        let file_name = path_parts.last().cloned().unwrap_or_default();
        let stem = match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name,
        };
        let name_sections: Vec<String> = stem.split('_').map(str::to_string).collect();
        let period_strings = Self::extract_period_strings(&name_sections);

        Self {
            path_parts,
            name_sections,
            period_strings,
        }
    }

    /// Name sections matching `p<period>` with a recognized period format,
    /// with the leading `p` stripped
    fn extract_period_strings(name_sections: &[String]) -> Vec<String> {
        name_sections
            .iter()
            .filter_map(|section| section.strip_prefix('p'))
            .filter(|candidate| PeriodFormat::categorize(candidate).is_some())
            .map(str::to_string)
            .collect()
    }

    /// The covered time range, derived from the period tokens.
    ///
    /// With one token the range is its floor..=ceiling. With two tokens the
    /// range is floor of the first..=ceiling of the second, accepted only
    /// when both tokens use the same format and the range is not inverted.
    /// Anything unparseable yields None.
    fn period_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self.period_strings.as_slice() {
            [] => None,
            [single] => {
                let format = PeriodFormat::categorize(single)?;
                Some((format.floor(single)?, format.ceil(single)?))
            }
            [first, second, ..] => {
                let first_format = PeriodFormat::categorize(first)?;
                let second_format = PeriodFormat::categorize(second)?;
                if first_format != second_format {
                    return None;
                }
                let floor = first_format.floor(first)?;
                let ceil = second_format.ceil(second)?;
                if ceil < floor {
                    return None;
                }
                Some((floor, ceil))
            }
        }
    }

    /// The earliest date from which data in the dataset is relevant
    pub fn contains_data_from(&self) -> Option<NaiveDate> {
        self.period_range().map(|(floor, _)| floor)
    }

    /// The latest date until which data in the dataset is relevant
    pub fn contains_data_until(&self) -> Option<NaiveDate> {
        self.period_range().map(|(_, ceil)| ceil)
    }

    /// The dataset state, matched against the canonical Norwegian folder
    /// names anywhere in the path. First matching path part wins.
    pub fn dataset_state(&self) -> Option<DataSetState> {
        for part in &self.path_parts {
            let normalized = part.to_lowercase();
            for state in DataSetState::ALL {
                if state_folder_variants(state)
                    .iter()
                    .any(|variant| *variant == normalized)
                {
                    return Some(state);
                }
            }
        }
        None
    }

    /// Version number from the trailing `_vN` token, if present
    pub fn dataset_version(&self) -> Option<String> {
        if self.name_sections.len() < 2 {
            return None;
        }
        let last = self.name_sections.last()?;
        if VERSION_TOKEN.is_match(last) {
            Some(last[1..].to_string())
        } else {
            None
        }
    }

    /// The dataset short name: the filename stem with period and version
    /// tokens stripped
    pub fn dataset_short_name(&self) -> Option<String> {
        let end = self
            .name_sections
            .iter()
            .position(|section| {
                section
                    .strip_prefix('p')
                    .is_some_and(|rest| PeriodFormat::categorize(rest).is_some())
            })
            .unwrap_or(if self.dataset_version().is_some() {
                self.name_sections.len() - 1
            } else {
                self.name_sections.len()
            });
        if end == 0 {
            return None;
        }
        Some(self.name_sections[..end].join("_"))
    }

    /// The data-product (statistic) short name: the path part immediately
    /// before the dataset-state folder
    pub fn statistic_short_name(&self) -> Option<String> {
        let state = self.dataset_state()?;
        let variants = state_folder_variants(state);
        let index = self
            .path_parts
            .iter()
            .position(|part| variants.iter().any(|v| *v == part.to_lowercase()))?;
        if index == 0 {
            return None;
        }
        self.path_parts.get(index - 1).cloned()
    }

    /// The storage root (bucket) the dataset lives under, if derivable
    pub fn bucket_name(&self) -> Option<String> {
        // Scheme-prefixed paths keep their authority as the first part
        if let Some(index) = self.path_parts.iter().position(|part| part == "buckets") {
            return self.path_parts.get(index + 1).cloned();
        }
        None
    }

    /// The storage root for scheme-prefixed paths (`gs://bucket/...`)
    pub fn bucket_name_from_uri(path: &str) -> Option<String> {
        let (_, rest) = path.split_once("://")?;
        rest.split('/').next().map(str::to_string)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_period_range_cases() {
        let cases = [
            (
                "grensehandel_imputert_p2022-10-01_p2022-12-31_v1.parquet",
                date(2022, 10, 1),
                date(2022, 12, 31),
            ),
            (
                "grensehandel_imputert_p2022-10_p2022-12_v1.parquet",
                date(2022, 10, 1),
                date(2022, 12, 31),
            ),
            (
                "flygende_objekter_p2019_v1.parquet",
                date(2019, 1, 1),
                date(2019, 12, 31),
            ),
            (
                "framskrevne-befolkningsendringer_p2019_p2050_v1.parquet",
                date(2019, 1, 1),
                date(2050, 12, 31),
            ),
            (
                "omsetning_p2020W15_v1.parquet",
                date(2020, 4, 6),
                date(2020, 4, 12),
            ),
            (
                "omsetning_p1981-W52_v1.parquet",
                date(1981, 12, 21),
                date(1981, 12, 27),
            ),
            (
                "personinntekt_p2022H1_v1.parquet",
                date(2022, 1, 1),
                date(2022, 6, 30),
            ),
            (
                "nybilreg_p2022T1_v1.parquet",
                date(2022, 1, 1),
                date(2022, 4, 30),
            ),
            (
                "varehandel_p2018Q1_p2018Q4_v1.parquet",
                date(2018, 1, 1),
                date(2018, 12, 31),
            ),
            (
                "pensjon_p2018Q1_v1.parquet",
                date(2018, 1, 1),
                date(2018, 3, 31),
            ),
            (
                "skipsanloep_p2021B2_v1.parquet",
                date(2021, 3, 1),
                date(2021, 4, 30),
            ),
            (
                "skipsanloep_p2022B1_v1.parquet",
                date(2022, 1, 1),
                date(2022, 2, 28),
            ),
        ];
        for (path, expected_from, expected_until) in cases {
            let info = DatasetPathInfo::new(path);
            assert_eq!(info.contains_data_from(), Some(expected_from), "{path}");
            assert_eq!(info.contains_data_until(), Some(expected_until), "{path}");
        }
    }

    #[test]
    fn test_no_period_token_yields_none() {
        for path in ["nonsen.data", "nonsens2.parquet", "person_data_v1.parquet"] {
            let info = DatasetPathInfo::new(path);
            assert_eq!(info.contains_data_from(), None, "{path}");
            assert_eq!(info.contains_data_until(), None, "{path}");
        }
    }

    #[test]
    fn test_invalid_period_ranges_fail_soft() {
        // Inverted ranges, mixed formats and out-of-range block indexes all
        // yield None rather than an error.
        for path in [
            "ufo_observasjoner_p2019_p1920_v1.parquet",
            "varehandel_p2018H2_p2018H1_v1.parquet",
            "varehandel_p2018Q1_p2018H2_v1.parquet",
            "sykkeltransport_p1973B8_v1.parquet",
            "sykkeltransport_p1973B2_p2020T8_v1.parquet",
        ] {
            let info = DatasetPathInfo::new(path);
            assert_eq!(info.contains_data_from(), None, "{path}");
            assert_eq!(info.contains_data_until(), None, "{path}");
        }
    }

    #[test]
    fn test_dataset_state_from_path() {
        let cases = [
            ("kildedata/person_data_v1.parquet", Some(DataSetState::SourceData)),
            ("inndata/person_data_v1.parquet", Some(DataSetState::InputData)),
            (
                "roskildedata/klargjorte-data/person_data_v1.parquet",
                Some(DataSetState::ProcessedData),
            ),
            (
                "klargjorte_data/person_data_v1.parquet",
                Some(DataSetState::ProcessedData),
            ),
            ("statistikk/person_data_v1.parquet", Some(DataSetState::Statistics)),
            (
                "utdata/min_statistikk/person_data_v1.parquet",
                Some(DataSetState::OutputData),
            ),
            ("my_special_data/person_data_v1.parquet", None),
        ];
        for (path, expected) in cases {
            assert_eq!(DatasetPathInfo::new(path).dataset_state(), expected, "{path}");
        }
    }

    #[test]
    fn test_dataset_version() {
        let cases = [
            ("person_data_v1", Some("1")),
            ("person_data_v2", Some("2")),
            ("person_data_v20.parquet", Some("20")),
            ("person_data_vwrong", None),
            ("person_data", None),
            ("person_testdata_p2021-12-31_p2021-12-31_v20", Some("20")),
        ];
        for (path, expected) in cases {
            assert_eq!(
                DatasetPathInfo::new(path).dataset_version().as_deref(),
                expected,
                "{path}"
            );
        }
    }

    #[test]
    fn test_dataset_short_name_strips_tokens() {
        assert_eq!(
            DatasetPathInfo::new("grensehandel_imputert_p2022-10-01_p2022-12-31_v1.parquet")
                .dataset_short_name()
                .as_deref(),
            Some("grensehandel_imputert")
        );
        assert_eq!(
            DatasetPathInfo::new("inndata/person_data_v1.parquet")
                .dataset_short_name()
                .as_deref(),
            Some("person_data")
        );
        assert_eq!(
            DatasetPathInfo::new("inndata/person_data.parquet")
                .dataset_short_name()
                .as_deref(),
            Some("person_data")
        );
    }

    #[test]
    fn test_statistic_short_name() {
        assert_eq!(
            DatasetPathInfo::new(
                "gs://ssb-staging-dapla-felles-data-delt/befolkning/klargjorte_data/person_data_v1.parquet"
            )
            .statistic_short_name()
            .as_deref(),
            Some("befolkning")
        );
        assert_eq!(
            DatasetPathInfo::new(
                "gs://ssb-staging-dapla-felles-data-delt/datadoc/person_data_v1.parquet"
            )
            .statistic_short_name(),
            None
        );
        assert_eq!(
            DatasetPathInfo::new("inndata/person_data_v1.parquet").statistic_short_name(),
            None
        );
    }

    #[test]
    fn test_bucket_name_from_uri() {
        assert_eq!(
            DatasetPathInfo::bucket_name_from_uri(
                "gs://ssb-staging-dapla-felles-data-delt/befolkning/inndata/person_data_v1.parquet"
            )
            .as_deref(),
            Some("ssb-staging-dapla-felles-data-delt")
        );
        assert_eq!(DatasetPathInfo::bucket_name_from_uri("inndata/x.parquet"), None);
    }

    #[test]
    fn test_floor_and_ceil_per_format() {
        assert_eq!(
            PeriodFormat::IsoYear.floor("1980"),
            Some(date(1980, 1, 1))
        );
        assert_eq!(
            PeriodFormat::IsoYearMonth.ceil("1888-11"),
            Some(date(1888, 11, 30))
        );
        assert_eq!(
            PeriodFormat::IsoYearMonthDay.floor("2203-01-24"),
            Some(date(2203, 1, 24))
        );
        assert_eq!(
            PeriodFormat::Bimester.floor("1963B3"),
            Some(date(1963, 5, 1))
        );
        assert_eq!(
            PeriodFormat::Bimester.ceil("1963B3"),
            Some(date(1963, 6, 30))
        );
        // Out-of-range block index fails soft
        assert_eq!(PeriodFormat::Bimester.floor("2003B8"), None);
        assert_eq!(PeriodFormat::Trimester.ceil("1999T8"), None);
    }

    #[test]
    fn test_leap_year_february_ceiling() {
        assert_eq!(
            PeriodFormat::IsoYearMonth.ceil("2024-02"),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            PeriodFormat::Bimester.ceil("2022B1"),
            Some(date(2022, 2, 28))
        );
    }
}
