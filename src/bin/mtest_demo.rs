// Demonstration runner: registers a few suites and runs them through the CLI.
// Usage: cargo run --bin mtest-demo -- [--format json] [--no-color]

use mtest::{
    check_eq, check_expect, check_ge, check_lt, check_ne, check_true, require_eq, require_true,
    suite, Engine,
};

fn fib(n: u32) -> u64 {
    (0..n).fold((0, 1), |(a, b), _| (b, a + b)).0
}

fn main() {
    let mut engine = Engine::new();

    suite!(engine, Math {
        fn addition(t) {
            check_eq!(t, 2 + 2, 4, "two plus two");
            check_ne!(t, 2 + 2, 5, "not five");
        }
        fn ordering(t) {
            check_lt!(t, 1, 2, "one is less than two");
            check_ge!(t, fib(10), 55, "fib(10) is at least 55");
        }
    });

    suite!(engine, Strings {
        fn uppercase(t) {
            check_expect!(t, "mtest".to_uppercase(), "MTEST", "uppercase conversion");
        }
        fn greeting(t) {
            let greeting = format!("hello {}", "brave world");
            check_expect!(t, greeting, "hello new world", "greeting text");
        }
        fn length(t) {
            check_eq!(t, "abc".len(), 3, "byte length");
        }
    });

    suite!(engine, Guards {
        fn config_present(t) {
            let config: Option<&str> = None;
            require_true!(t, config.is_some(), "configuration must be loaded");
            check_true!(t, config.unwrap_or_default().is_empty(), "unreachable");
        }
        fn never_runs(t) {
            require_eq!(t, 1, 1, "skipped after fatal failure");
        }
    });

    mtest::cli::run(engine)
}
