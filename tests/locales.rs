//! Locale files must stay in step with each other and with the keys the
//! code looks up at runtime.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use ordr::catalog::Difficulty;
use ordr::config::LANGUAGES;
use ordr::engine::drill::GameMode;
use ordr::engine::events::Notice;

fn flatten(prefix: &str, value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => if *b { "on" } else { "off" }.to_string(),
                    other => panic!("unexpected key {other:?}"),
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, v, out);
            }
        }
        _ => {
            out.insert(prefix.to_string());
        }
    }
}

fn load_keys(lang: &str) -> BTreeSet<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("locales")
        .join(format!("{lang}.yml"));
    let content = fs::read_to_string(&path).unwrap();
    let value: Value = serde_yaml::from_str(&content).unwrap();
    let mut keys = BTreeSet::new();
    flatten("", &value, &mut keys);
    keys
}

#[test]
fn every_language_has_the_same_keys() {
    let en = load_keys("en");
    for lang in LANGUAGES {
        let keys = load_keys(lang);
        let missing: Vec<_> = en.difference(&keys).collect();
        let extra: Vec<_> = keys.difference(&en).collect();
        assert!(missing.is_empty(), "{lang} is missing {missing:?}");
        assert!(extra.is_empty(), "{lang} has unknown keys {extra:?}");
    }
}

#[test]
fn runtime_keys_exist() {
    let en = load_keys("en");
    let notices = [
        Notice::EmptyAnswer,
        Notice::Correct,
        Notice::TryAgain,
        Notice::LostHeart,
        Notice::TimeoutLostHeart,
        Notice::TimeoutNoAnswer,
        Notice::HintAdded,
        Notice::NoMoreHints,
        Notice::NoAudio,
        Notice::AudioFailed,
        Notice::NoListeningWords,
        Notice::MusicUnavailable,
        Notice::NoWords,
        Notice::ChapterLocked,
    ];
    for notice in notices {
        assert!(en.contains(notice.key()), "missing {}", notice.key());
    }
    for mode in [GameMode::Practice, GameMode::Action] {
        assert!(en.contains(&format!("mode.{}", mode.as_str())));
    }
    for difficulty in Difficulty::all() {
        assert!(en.contains(&format!("difficulty.{}", difficulty.as_str())));
    }
    for lang in LANGUAGES {
        assert!(en.contains(&format!("language.{lang}")));
    }
}
