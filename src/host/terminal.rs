//! Status and notice surfaces that print to the terminal

use std::io::Write;

use super::traits::{Notice, NoticeLevel, NoticeSurface, StatusSurface};

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalStatus;

impl StatusSurface for TerminalStatus {
    fn show(&self, title: &str, body: &str) {
        println!("\n== {title} ==\n{body}");
    }

    fn set_countdown(&self, clock: &str, low_time: bool) {
        let marker = if low_time { " !" } else { "" };
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "\r  {clock}{marker}  ");
        let _ = stdout.flush();
    }

    fn hide(&self) {
        println!();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotices;

impl NoticeSurface for TerminalNotices {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("[ok] {}", notice.message),
            NoticeLevel::Warning => eprintln!("[warn] {}", notice.message),
            NoticeLevel::Error => eprintln!("[error] {}", notice.message),
        }
    }
}
