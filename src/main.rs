use minishell::Interpreter;

fn main() {
    let code = Interpreter::default().repl().unwrap_or_else(|e| {
        eprintln!("minishell: {}", e);
        1
    });
    std::process::exit(code);
}
