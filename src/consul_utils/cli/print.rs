use colored::{ColoredString, Colorize};
use consul_utils::commands::{CmdMessage, MessageLevel};

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        eprintln!("{}", styled(message));
    }
}

fn styled(message: &CmdMessage) -> ColoredString {
    match message.level {
        MessageLevel::Info => message.content.dimmed(),
        MessageLevel::Success => message.content.green(),
        MessageLevel::Warning => message.content.yellow(),
        MessageLevel::Error => message.content.red(),
    }
}
