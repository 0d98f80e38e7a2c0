// crates/geores-core/src/loader/geonames.rs

//! Readers for the GeoNames dump formats.

use log::{info, warn};
use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{GeoError, Result};
use crate::raw::GeoNameRaw;

/// Counts from one pass over a dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub lines: usize,
    pub records: usize,
    pub skipped: usize,
}

/// Feeds every parseable record of a GeoNames TSV dump to `visit`.
///
/// Blank lines and `#` comments are ignored. Malformed lines are logged and
/// skipped so one bad line does not abort the load.
pub fn for_each_record<R: BufRead>(
    reader: R,
    mut visit: impl FnMut(GeoNameRaw),
) -> Result<ReadStats> {
    let mut stats = ReadStats::default();
    for line in reader.lines() {
        let line = line.map_err(GeoError::Io)?;
        stats.lines += 1;
        if stats.lines % 100_000 == 0 {
            info!("rowcount: {}", stats.lines);
        }
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match GeoNameRaw::from_tsv_line(&line) {
            Ok(raw) => {
                stats.records += 1;
                visit(raw);
            }
            Err(e) => {
                stats.skipped += 1;
                info!("Skipping... Error on line: {} ({})", line, e);
            }
        }
    }
    Ok(stats)
}

/// One row of the GeoNames `alternateNamesV2` dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateName {
    pub geoname_id: i64,
    pub lang: String,
    pub name: String,
    pub preferred: bool,
    pub short: bool,
}

impl AlternateName {
    const ID_FIELD: usize = 1;
    const LANG_FIELD: usize = 2;
    const NAME_FIELD: usize = 3;
    const PREFERRED_FIELD: usize = 4;
    const SHORT_FIELD: usize = 5;

    pub fn from_tsv_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= Self::NAME_FIELD {
            return Err(GeoError::InvalidData(format!(
                "Alternate name record has {} columns: {}",
                fields.len(),
                line
            )));
        }
        let geoname_id = fields[Self::ID_FIELD].trim().parse::<i64>().map_err(|e| {
            GeoError::InvalidData(format!("Invalid geoname id [{}]: {}", fields[Self::ID_FIELD], e))
        })?;
        let flag = |idx: usize| fields.get(idx).is_some_and(|f| f.trim() == "1");

        Ok(Self {
            geoname_id,
            lang: fields[Self::LANG_FIELD].to_string(),
            name: fields[Self::NAME_FIELD].to_string(),
            preferred: flag(Self::PREFERRED_FIELD),
            short: flag(Self::SHORT_FIELD),
        })
    }

    pub fn is_english(&self) -> bool {
        self.lang.eq_ignore_ascii_case("en") || self.lang.eq_ignore_ascii_case("eng")
    }

    pub fn is_preferred_or_short(&self) -> bool {
        self.preferred || self.short
    }

    /// The better of two names for the same record: preferred beats
    /// non-preferred, then short beats non-short, then `self` wins.
    pub fn best(self, other: Option<AlternateName>) -> AlternateName {
        match other {
            Some(other) if (other.preferred, other.short) > (self.preferred, self.short) => other,
            _ => self,
        }
    }
}

/// Reads the English preferred or short name of each record.
pub fn read_alternate_names<R: BufRead>(reader: R) -> Result<HashMap<i64, AlternateName>> {
    let mut names: HashMap<i64, AlternateName> = HashMap::new();
    let mut lines = 0usize;
    for line in reader.lines() {
        let line = line.map_err(GeoError::Io)?;
        lines += 1;
        if line.trim().is_empty() {
            continue;
        }
        let name = match AlternateName::from_tsv_line(&line) {
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping alternate name: {}", e);
                continue;
            }
        };
        if name.is_english() && name.is_preferred_or_short() {
            let existing = names.remove(&name.geoname_id);
            let best = name.best(existing);
            names.insert(best.geoname_id, best);
        }
    }
    info!("Processed {} alternate names.  Found {} names.", lines, names.len());
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_bad_lines() {
        let dump = "\
# comment
4781530\tReston\tReston\t\t38.96872\t-77.3411\tP\tPPL\tUS\t\tVA\t059\t\t\t58404\t100\t102\tAmerica/New_York\t2011-05-14

garbage\tline
";
        let mut ids = Vec::new();
        let stats = for_each_record(dump.as_bytes(), |raw| ids.push(raw.id)).unwrap();
        assert_eq!(ids, vec![4781530]);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn picks_preferred_then_short_english_names() {
        let dump = "\
1\t6252001\ten\tUSA\t\t1\t\t\t\t
2\t6252001\ten\tUnited States of America\t1\t\t\t\t\t
3\t6252001\tde\tVereinigte Staaten\t1\t\t\t\t\t
4\t6252001\ten\tAmerica\t\t\t\t\t\t
5\t6254928\ten\tVirginia\t\t1\t\t\t\t
6\t6254928\ten\tOld Dominion\t\t\t1\t\t\t
";
        let names = read_alternate_names(dump.as_bytes()).unwrap();
        assert_eq!(names[&6252001].name, "United States of America");
        assert_eq!(names[&6254928].name, "Virginia");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn preferred_short_name_wins_over_preferred() {
        let long = AlternateName::from_tsv_line("1\t1\ten\tLong Name\t1\t\t").unwrap();
        let short = AlternateName::from_tsv_line("2\t1\ten\tShort\t1\t1\t").unwrap();
        assert_eq!(long.clone().best(Some(short.clone())).name, "Short");
        assert_eq!(short.best(Some(long)).name, "Short");
    }
}
