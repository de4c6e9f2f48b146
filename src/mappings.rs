//! Static lookup tables from raw locale codes to canonical (Korean) labels.
//!
//! Tables are plain immutable data. Build them once at process start, with
//! [`MappingTables::default`] or [`MappingTables::load`], and pass them by
//! reference into the normalizer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const CITY: &[(&str, &str)] = &[
    ("Seoul", "서울"),
    // Gyeonggi-do
    ("Yongin", "용인"),
    ("Seongnam", "성남"),
    ("Ansan", "안산"),
    ("Anyang", "안양"),
    ("Suwon", "수원"),
    ("Goyang", "고양"),
    ("Siheung", "시흥"),
    ("Uijeongbu", "의정부"),
    ("Bucheon", "부천"),
    ("Gimpo", "김포"),
    ("Gunpo", "군포"),
    ("Hanam", "하남"),
    ("Pocheon", "포천"),
    ("Pyeongtaek", "평택"),
    ("화성", "화성"),
    ("의왕", "의왕"),
    ("오산", "오산"),
    ("구리", "구리"),
    // Metropolitan cities
    ("Incheon", "인천"),
    ("Daegu", "대구"),
    ("Daejeon", "대전"),
    ("Busan", "부산"),
    ("Ulsan", "울산"),
    ("Gwangju", "광주"),
    ("Sejong", "세종"),
    // Chungcheong
    ("Cheonan", "천안"),
    ("Asan", "아산"),
    ("Nonsan", "논산"),
    ("서산", "서산"),
    ("Cheongju", "청주"),
    ("Chungju", "충주"),
    ("진천", "진천"),
    ("옥천", "옥천"),
    // Jeolla
    ("Jeonju", "전주"),
    ("Iksan", "익산"),
    ("Gunsan", "군산"),
    ("해남", "해남"),
    // Gyeongsang
    ("Gyeongsan", "경산"),
    ("Gumi", "구미"),
    ("Andong", "안동"),
    ("봉화", "봉화"),
    ("칠곡", "칠곡"),
    ("대영", "대영"),
    ("Changwon", "창원"),
    ("Gimhae", "김해"),
    ("Yangsan", "양산"),
    ("사천", "사천"),
    // Gangwon
    ("Donghae", "동해"),
    ("Wonju", "원주"),
    ("Sokcho", "속초"),
    ("Taebaek", "태백"),
    ("Chuncheon", "춘천"),
    ("Gangwon", "강원"),
    ("Jeju", "제주"),
];

const REGION_GROUP: &[(&str, &str)] = &[
    ("Seoul", "서울특별시"),
    ("Gyeonggi-do", "경기도"),
    ("Incheon", "인천광역시"),
    ("Busan", "부산광역시"),
    ("Daegu", "대구광역시"),
    ("Daejeon", "대전광역시"),
    ("Gwangju", "광주광역시"),
    ("Ulsan", "울산광역시"),
    ("Sejong", "세종특별자치시"),
    ("Gangwon-do", "강원도"),
    ("Chungcheongbuk-do", "충청북도"),
    ("Chungcheongnam-do", "충청남도"),
    ("Jeollabuk-do", "전라북도"),
    ("Jeollanam-do", "전라남도"),
    ("Gyeongsangbuk-do", "경상북도"),
    ("Gyeongsangnam-do", "경상남도"),
    ("Jeju", "제주특별자치도"),
];

const AGE_GROUP: &[(&str, &str)] = &[
    ("Teens", "10대"),
    ("Twenties", "20대"),
    ("Thirties", "30대"),
    ("Forties+", "40대 이상"),
];

/// Raw code → canonical label tables for the three locale dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTables {
    #[serde(default)]
    pub city: HashMap<String, String>,
    #[serde(default)]
    pub region_group: HashMap<String, String>,
    #[serde(default)]
    pub age_group: HashMap<String, String>,
}

impl Default for MappingTables {
    /// The built-in tables.
    fn default() -> Self {
        Self {
            city: table(CITY),
            region_group: table(REGION_GROUP),
            age_group: table(AGE_GROUP),
        }
    }
}

impl MappingTables {
    /// Tables with no entries; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            city: HashMap::new(),
            region_group: HashMap::new(),
            age_group: HashMap::new(),
        }
    }

    /// Built-in tables extended (and overridden) by a JSON file.
    ///
    /// The file holds an object with optional `city`, `region_group` and
    /// `age_group` maps. Entries in the file win over built-in ones.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let overrides: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse mapping tables in {}", path.display()))?;
        Ok(Self::default().merged(overrides))
    }

    /// Returns `self` with every entry of `other` inserted over it.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.city.extend(other.city);
        self.region_group.extend(other.region_group);
        self.age_group.extend(other.age_group);
        self
    }

    #[must_use]
    pub fn city(&self, code: &str) -> Option<&str> {
        self.city.get(code).map(String::as_str)
    }

    #[must_use]
    pub fn region_group(&self, code: &str) -> Option<&str> {
        self.region_group.get(code).map(String::as_str)
    }

    #[must_use]
    pub fn age_group(&self, code: &str) -> Option<&str> {
        self.age_group.get(code).map(String::as_str)
    }
}

fn table(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_cover_known_codes() {
        let t = MappingTables::default();
        assert_eq!(t.city("Suwon"), Some("수원"));
        assert_eq!(t.city("화성"), Some("화성"));
        assert_eq!(t.region_group("Gyeonggi-do"), Some("경기도"));
        assert_eq!(t.age_group("Forties+"), Some("40대 이상"));
        assert_eq!(t.region_group("Jeju-do"), None);
    }

    #[test]
    fn merged_overrides_win() {
        let mut extra = MappingTables::empty();
        extra.city.insert("Suwon".into(), "수원시".into());
        extra.region_group.insert("Jeju-do".into(), "제주특별자치도".into());

        let t = MappingTables::default().merged(extra);
        assert_eq!(t.city("Suwon"), Some("수원시"));
        assert_eq!(t.region_group("Jeju-do"), Some("제주특별자치도"));
        assert_eq!(t.region_group("Seoul"), Some("서울특별시"));
    }
}
