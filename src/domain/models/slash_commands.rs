#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .split_whitespace()
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args.remove(0).to_lowercase();

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_help()
            || cmd.is_upload()
            || cmd.is_login()
            || cmd.is_register()
            || cmd.is_logout()
            || cmd.is_whoami()
            || cmd.is_course_list()
            || cmd.is_course_select()
            || cmd.is_course_create()
            || cmd.is_summary_list()
            || cmd.is_summary_show()
            || cmd.is_save()
            || cmd.is_quiz()
            || cmd.is_assignment()
            || cmd.is_new_chat()
            || cmd.is_chat_list()
            || cmd.is_chat_load()
            || cmd.is_theme()
        {
            return Some(cmd);
        }

        return None;
    }

    /// Arguments joined back together, for values that may contain spaces.
    pub fn rest(&self) -> String {
        return self.args.join(" ");
    }

    /// First argument parsed as a 1-based list position.
    pub fn index_arg(&self) -> Option<usize> {
        let idx = self.args.first()?.parse::<usize>().ok()?;
        if idx == 0 {
            return None;
        }
        return Some(idx - 1);
    }

    fn is(&self, names: &[&str]) -> bool {
        return names.contains(&self.command.as_str());
    }

    pub fn is_quit(&self) -> bool {
        return self.is(&["/q", "/quit", "/exit"]);
    }

    pub fn is_help(&self) -> bool {
        return self.is(&["/h", "/help"]);
    }

    pub fn is_upload(&self) -> bool {
        return self.is(&["/u", "/upload"]) && !self.args.is_empty();
    }

    pub fn is_login(&self) -> bool {
        return self.is(&["/l", "/login"]) && !self.args.is_empty();
    }

    pub fn is_register(&self) -> bool {
        return self.is(&["/register"]) && !self.args.is_empty();
    }

    pub fn is_logout(&self) -> bool {
        return self.is(&["/logout"]);
    }

    pub fn is_whoami(&self) -> bool {
        return self.is(&["/whoami"]);
    }

    pub fn is_course_list(&self) -> bool {
        return self.is(&["/courses"]);
    }

    pub fn is_course_select(&self) -> bool {
        return self.is(&["/course"]) && !self.args.is_empty();
    }

    pub fn is_course_create(&self) -> bool {
        return self.is(&["/newcourse"]) && !self.args.is_empty();
    }

    pub fn is_summary_list(&self) -> bool {
        return self.is(&["/summaries"]);
    }

    pub fn is_summary_show(&self) -> bool {
        return self.is(&["/summary"]) && !self.args.is_empty();
    }

    pub fn is_save(&self) -> bool {
        return self.is(&["/save"]);
    }

    pub fn is_quiz(&self) -> bool {
        return self.is(&["/quiz"]);
    }

    pub fn is_assignment(&self) -> bool {
        return self.is(&["/assignment"]);
    }

    pub fn is_new_chat(&self) -> bool {
        return self.is(&["/new"]);
    }

    pub fn is_chat_list(&self) -> bool {
        return self.is(&["/chats"]);
    }

    pub fn is_chat_load(&self) -> bool {
        return self.is(&["/chat"]) && !self.args.is_empty();
    }

    pub fn is_theme(&self) -> bool {
        return self.is(&["/theme"]);
    }
}
