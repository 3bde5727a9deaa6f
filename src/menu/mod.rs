use std::io::{self, BufRead, Write};

use crate::config::{Config, TargetVersion};
use crate::filesystem::expand_home;
use crate::operations::{OperationError, Session};

/// Target versions offered by the first menu, in menu order.
pub const TARGET_CHOICES: [&str; 5] = ["1.21", "1.20", "1.19", "1.12", "1.7.10"];

const INVALID_CHOICE: &str = "Press a number between 1 and 5 please.";

/// An entry of the operation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    PurgeStale,
    RemoveDuplicates,
    UpdateDiff,
    SideDiff,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::PurgeStale),
            "2" => Some(Self::RemoveDuplicates),
            "3" => Some(Self::UpdateDiff),
            "4" => Some(Self::SideDiff),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Interactive console loop over arbitrary input and output streams.
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Runs the menu until the operator exits or input ends.
    ///
    /// A failed operation is reported and the menu continues; only console I/O errors
    /// end the loop early.
    pub fn run(&mut self, config: Config) -> io::Result<()> {
        writeln!(self.output, "Welcome to the Minecraft mod manager!")?;

        let Some(target) = self.select_target()? else {
            return Ok(());
        };
        let session = match Session::new(target, config) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Invalid configuration: {e}");
                writeln!(self.output, "Invalid configuration: {e}")?;
                return Ok(());
            }
        };

        loop {
            let Some(choice) = self.select_operation()? else {
                return Ok(());
            };
            if choice == MenuChoice::Exit {
                writeln!(self.output, "Exiting...")?;
                return Ok(());
            }

            match self.dispatch(&session, choice) {
                Ok(Some(message)) => writeln!(self.output, "{message}\n")?,
                Ok(None) => return Ok(()),
                Err(e) => {
                    log::error!("Operation failed: {e}");
                    writeln!(self.output, "Operation failed: {e}\n")?;
                }
            }
        }
    }

    /// Reads one trimmed line, or `None` at end of input.
    fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn select_target(&mut self) -> io::Result<Option<TargetVersion>> {
        let mut question = String::from("Please select a minecraft version:\n");
        for (i, v) in TARGET_CHOICES.iter().enumerate() {
            let label = if v.matches('.').count() == 1 { format!("{v}.X") } else { v.to_string() };
            question.push_str(&format!("{}. {}\n", i + 1, label));
        }

        loop {
            let Some(answer) = self.prompt(&question)? else {
                return Ok(None);
            };
            let picked = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| TARGET_CHOICES.get(i))
                .and_then(|v| TargetVersion::parse(v).ok());

            match picked {
                Some(target) => return Ok(Some(target)),
                None => writeln!(self.output, "{INVALID_CHOICE}\n")?,
            }
        }
    }

    fn select_operation(&mut self) -> io::Result<Option<MenuChoice>> {
        let question = "Select an option:\n\
            1. Check update mods for incorrect minecraft versions.\n\
            2. Delete duplicate mods in the update folder.\n\
            3. Compare folders and update the version update file.\n\
            4. Find clientside and serverside-only files.\n\
            5. Exit.\n";

        loop {
            let Some(answer) = self.prompt(question)? else {
                return Ok(None);
            };
            match MenuChoice::parse(&answer) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "{INVALID_CHOICE}\n")?,
            }
        }
    }

    /// Runs one operation. `Ok(None)` means input ended while asking for a path.
    fn dispatch(&mut self, session: &Session, choice: MenuChoice) -> Result<Option<String>, OperationError> {
        let message = match choice {
            MenuChoice::PurgeStale => {
                let Some(dir) = self.prompt("Enter the folder path: ")? else {
                    return Ok(None);
                };
                let summary = session.purge_stale(&expand_home(&dir))?;
                for file in &summary.deleted {
                    writeln!(self.output, "Deleting {file} because it's not the right version")?;
                }
                format!("{} mods removed.", summary.deleted.len())
            }
            MenuChoice::RemoveDuplicates => {
                let Some(dir) = self.prompt("Enter the folder path: ")? else {
                    return Ok(None);
                };
                let removed = session.remove_duplicates(&expand_home(&dir))?;
                for r in &removed {
                    writeln!(self.output, "Removed duplicate mod: {} {}", r.parsed.name, r.parsed.version)?;
                }
                "Duplicate mods removed, keeping only the highest versions.".to_string()
            }
            MenuChoice::UpdateDiff => {
                let Some(main) = self.prompt("Enter the main folder path: ")? else {
                    return Ok(None);
                };
                let Some(update) = self.prompt("Enter the updates folder path: ")? else {
                    return Ok(None);
                };
                let (_, path) = session.update_diff(&expand_home(&main), &expand_home(&update))?;
                format!("Processed filenames saved to {}", path.display())
            }
            MenuChoice::SideDiff => {
                let Some(client) = self.prompt("Enter the client folder path: ")? else {
                    return Ok(None);
                };
                let Some(server) = self.prompt("Enter the server folder path: ")? else {
                    return Ok(None);
                };
                let (report, path) = session.side_diff(&expand_home(&client), &expand_home(&server))?;
                writeln!(self.output, "{}", report.render())?;
                format!("Client and serverside files saved to {}", path.display())
            }
            MenuChoice::Exit => return Ok(None),
        };
        Ok(Some(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Cursor;

    fn run_script(script: &str) -> String {
        let mut output = Vec::new();
        Menu::new(Cursor::new(script.as_bytes()), &mut output)
            .run(Config::default())
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parses_menu_choices() {
        assert_eq!(MenuChoice::parse(" 3 "), Some(MenuChoice::UpdateDiff));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("6"), None);
        assert_eq!(MenuChoice::parse("one"), None);
    }

    #[test]
    fn reprompts_on_invalid_input_then_exits() {
        let out = run_script("9\nx\n1\n0\n5\n");
        assert_eq!(out.matches(INVALID_CHOICE).count(), 3);
        assert!(out.contains("1. 1.21.X"));
        assert!(out.contains("5. 1.7.10"));
        assert!(out.ends_with("Exiting...\n"));
    }

    #[test]
    fn stops_quietly_at_end_of_input() {
        let out = run_script("1\n");
        assert!(out.contains("Select an option:"));
        assert!(!out.contains("Exiting..."));
    }

    #[test]
    fn runs_update_diff_from_prompts() {
        let main = tempfile::tempdir().unwrap();
        let update = tempfile::tempdir().unwrap();
        File::create(main.path().join("modA-1.0.jar")).unwrap();
        File::create(update.path().join("modA-2.0.jar")).unwrap();

        let script = format!("1\n3\n{}\n{}\n5\n", main.path().display(), update.path().display());
        let out = run_script(&script);
        assert!(out.contains("Processed filenames saved to"));
        assert!(main.path().join("processed_mods.txt").exists());
    }

    #[test]
    fn failed_operation_is_reported_and_menu_continues() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let script = format!("1\n2\n{}\n5\n", missing.display());
        let out = run_script(&script);
        assert!(out.contains("Operation failed:"));
        assert!(out.ends_with("Exiting...\n"));
    }
}
