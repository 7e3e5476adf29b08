//! The `commodore` command line tool.

fn main() {
    commodore::cli::run();
}
