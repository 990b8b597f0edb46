use chrono::TimeDelta;
use colored::Colorize;
use env_binder::{EnvConfig, Loader, format_config_error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, EnvConfig)]
pub struct DatabaseConfig {
    #[field(env = "TEST_DB_HOST", default = "localhost")]
    pub host: String,

    #[field(env = "TEST_DB_PORT", default = 5432, min = 1, max = 65535)]
    pub port: i64,
}

#[derive(Debug, Default, EnvConfig)]
pub struct WorkingConfig {
    #[field(env = "TEST_STRING", required)]
    pub test_string: String,

    #[field(env = "TEST_INT", default = 123)]
    pub test_int: i64,

    #[field(env = "TEST_BOOL_TRUE", default = false)]
    pub test_bool: bool,

    #[field(env = "TEST_RATIO", default = 0.5, min = 0, max = 1)]
    pub ratio: f64,

    #[field(env = "TEST_LIST")]
    pub list: Vec<String>,

    #[field(env = "TEST_TIMEOUT", default = "30")]
    pub timeout: TimeDelta,

    pub database: DatabaseConfig,
}

#[derive(Debug, Default, EnvConfig)]
pub struct ErrorConfig {
    #[field(env = "TEST_STRING", required)]
    pub test_string: String,

    #[field(env = "TEST_WRONG_TYPE", default = 42)]
    pub test_wrong_type: i64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    dotenvy::from_filename("./test.env").ok();
    match std::env::args().nth(1) {
        Some(arg) => match arg.as_str() {
            "default" => test_with_config(),
            "error" => test_with_config_error(),
            "error_result" => test_with_config_error_result(),
            "prefix" => test_with_prefix(std::env::args().nth(2).unwrap_or_default()),
            _ => println!(
                "unknown arg: {}. Available: default, error, error_result, prefix",
                arg
            ),
        },
        None => {
            println!("Usage: env-binder-cli [command]");
            println!("Commands:");
            println!("  default       - Load a config from test.env and defaults");
            println!("  error         - Load a config that fails, panicking");
            println!("  error_result  - Load a config that fails, printing the error");
            println!("  prefix <P>    - Load the working config with key prefix <P>");
            println!();
            println!("Set RUST_LOG=env_binder=debug to see where each value came from.");
        }
    };
}

fn print_config(config: &WorkingConfig) {
    println!("{}", "Config loaded successfully!".green().bold());
    println!("  test_string: {}", config.test_string);
    println!("  test_int: {}", config.test_int);
    println!("  test_bool: {}", config.test_bool);
    println!("  ratio: {}", config.ratio);
    println!("  list: {:?}", config.list);
    println!("  timeout: {}s", config.timeout.num_seconds());
    println!(
        "  database: {}:{}",
        config.database.host, config.database.port
    );
}

fn test_with_config() {
    let config = WorkingConfig::load();
    print_config(&config);
}

fn test_with_config_error() {
    let _config = ErrorConfig::load();
    println!("you should not see this");
}

fn test_with_config_error_result() {
    match ErrorConfig::from_env() {
        Ok(config) => {
            println!("{}", "Config loaded successfully!".green().bold());
            println!("  test_string: {}", config.test_string);
            println!("  test_wrong_type: {}", config.test_wrong_type);
        }
        Err(error) => {
            eprintln!("{}", format_config_error(&error));
            eprintln!("\tpath: {}", error.path().magenta());
        }
    }
    println!("all done");
}

fn test_with_prefix(prefix: String) {
    let loader = Loader::builder().with_prefix(prefix).build();
    let mut config = WorkingConfig::default();
    match loader.load_config(&mut config) {
        Ok(()) => print_config(&config),
        Err(error) => eprintln!("{}", format_config_error(&error)),
    }
}
