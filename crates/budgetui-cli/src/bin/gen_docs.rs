//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", budgetui_cli::render_options_markdown());
}
