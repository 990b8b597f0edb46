use env_binder::{ConfigError, EnvConfig, Kind, ParseError};
use serial_test::serial;

fn set(key: &str, value: &str) {
    // SAFETY: every test touching the environment is #[serial]
    unsafe { std::env::set_var(key, value) };
}

fn unset(key: &str) {
    // SAFETY: every test touching the environment is #[serial]
    unsafe { std::env::remove_var(key) };
}

// For testing wrong type errors (errors expected)
#[derive(Debug, Default, EnvConfig)]
pub struct WrongTypeConfig {
    // Loaded from test.env, TEST_WRONG_TYPE=not-a-number
    #[field(env = "TEST_WRONG_TYPE", default = 8080)]
    pub wrong_type: i64,
}

#[derive(Debug, Default, EnvConfig)]
pub struct ScalarConfig {
    #[field(env = "PARSE_INT")]
    pub int: isize,

    #[field(env = "PARSE_BOOL")]
    pub flag: bool,

    #[field(env = "PARSE_FLOAT")]
    pub ratio: f64,
}

#[derive(Debug, Default, EnvConfig)]
pub struct SequenceConfig {
    #[field(env = "PARSE_NUMBERS")]
    pub numbers: Vec<i64>,

    #[field(env = "PARSE_FLAGS")]
    pub flags: Vec<bool>,
}

#[derive(Debug, Default, EnvConfig)]
pub struct UnsupportedElementConfig {
    #[field(env = "PARSE_SMALL_NUMBERS", default = "1,2")]
    pub small: Vec<u8>,
}

#[test]
#[serial]
fn test_wrong_type_returns_error() {
    dotenvy::from_filename("./test.env").ok();
    // TEST_WRONG_TYPE should be configured, but not be an int
    let err = WrongTypeConfig::from_env().unwrap_err();

    assert_eq!(err.path(), "wrong_type");
    match err.root_cause() {
        ConfigError::Parse(ParseError::Int { literal, .. }) => {
            assert_eq!(literal, "not-a-number")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
#[serial]
#[should_panic(expected = "wrong_type")]
fn test_wrong_type_should_panic() {
    colored::control::set_override(false);
    dotenvy::from_filename("./test.env").ok();
    let _config = WrongTypeConfig::load();
}

#[test]
#[serial]
fn test_unset_scalars_keep_zero_values() {
    let config = ScalarConfig::from_env().unwrap();
    assert_eq!(config.int, 0);
    assert!(!config.flag);
    assert_eq!(config.ratio, 0.0);
}

#[test]
#[serial]
fn test_scalar_parse_errors() {
    let cases = [
        ("PARSE_INT", "4.2", "int"),
        ("PARSE_BOOL", "yes", "flag"),
        ("PARSE_FLOAT", "half", "ratio"),
    ];

    for (key, raw, field) in cases {
        set(key, raw);
        let err = ScalarConfig::from_env().unwrap_err();
        assert_eq!(err.path(), field, "{}={}", key, raw);
        assert!(
            matches!(err.root_cause(), ConfigError::Parse(_)),
            "{:?}",
            err
        );
        unset(key);
    }
}

#[test]
#[serial]
fn test_bool_literals() {
    for raw in ["1", "t", "T", "TRUE", "true", "True"] {
        set("PARSE_BOOL", raw);
        assert!(ScalarConfig::from_env().unwrap().flag, "{}", raw);
    }
    for raw in ["0", "f", "F", "FALSE", "false", "False"] {
        set("PARSE_BOOL", raw);
        assert!(!ScalarConfig::from_env().unwrap().flag, "{}", raw);
    }
    for raw in ["tRUE", "on", "2"] {
        set("PARSE_BOOL", raw);
        let err = ScalarConfig::from_env().unwrap_err();
        assert!(
            matches!(err.root_cause(), ConfigError::Parse(ParseError::Bool(_))),
            "{}",
            raw
        );
    }
    unset("PARSE_BOOL");
}

#[test]
#[serial]
fn test_sequence_elements_are_not_trimmed() {
    set("PARSE_NUMBERS", "1,2,3");
    set("PARSE_FLAGS", "true,false");
    let config = SequenceConfig::from_env().unwrap();
    assert_eq!(config.numbers, vec![1, 2, 3]);
    assert_eq!(config.flags, vec![true, false]);

    set("PARSE_NUMBERS", "1, 2");
    let err = SequenceConfig::from_env().unwrap_err();
    assert_eq!(err.path(), "numbers");
    assert!(matches!(
        err.root_cause(),
        ConfigError::Parse(ParseError::Int { .. })
    ));

    unset("PARSE_NUMBERS");
    unset("PARSE_FLAGS");
}

#[test]
#[serial]
fn test_sequence_with_empty_element_uses_zero() {
    set("PARSE_NUMBERS", "1,,3");
    let config = SequenceConfig::from_env().unwrap();
    assert_eq!(config.numbers, vec![1, 0, 3]);
    unset("PARSE_NUMBERS");
}

#[test]
#[serial]
fn test_unsupported_slice_element_type() {
    let err = UnsupportedElementConfig::from_env().unwrap_err();
    assert_eq!(err.path(), "small");
    assert!(matches!(
        err.root_cause(),
        ConfigError::Parse(ParseError::UnsupportedElement(Kind::Uint8))
    ));
    assert_eq!(
        err.to_string(),
        "field small: unsupported slice element type: uint8"
    );
}
