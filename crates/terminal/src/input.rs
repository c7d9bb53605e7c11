use coordinator::Control;

/// Maps one line of user input to a control signal. Anything that is not a
/// command word is passed on as move text; blank lines are ignored.
pub fn parse_command(line: &str) -> Option<Control> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let control = match trimmed.to_ascii_lowercase().as_str() {
        "play" | "new" => Control::NewGame,
        "menu" => Control::ReturnToMenu,
        "about" | "help" => Control::About,
        "quit" | "exit" => Control::Quit,
        _ => Control::Move(trimmed.to_string()),
    };
    Some(control)
}
