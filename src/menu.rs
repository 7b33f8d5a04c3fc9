// SPDX-License-Identifier: MPL-2.0

//! 번호 메뉴 모듈입니다.
//!
//! 입력은 공백으로 구분된 토큰 단위로 읽으므로 한 줄에 여러 선택을 입력할 수 있습니다.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

const MENU_TEXT: &str = "\n\n\
1. enroll user certificate\n\
2. delay user certificate\n\
3. revoke user certificate\n\
4. query user certificates\n\
5. reset PIN\n\
6. show SMCertSDK version\n\
7. SM login\n\
100. exit\n\n";

const CHOICE_PROMPT: &str = "select an option: ";
const CERT_ID_PROMPT: &str = "enter certificate id: ";
const NEW_PIN_PROMPT: &str = "enter new PIN, at least 6 characters: ";
const INVALID_CHOICE: &str = "no such option, exiting";

/// 메뉴 선택지
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Enroll,
    Delay,
    Revoke,
    Query,
    ResetPin,
    Version,
    Login,
    Exit,
    Invalid,
}

impl MenuChoice {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Enroll,
            2 => Self::Delay,
            3 => Self::Revoke,
            4 => Self::Query,
            5 => Self::ResetPin,
            6 => Self::Version,
            7 => Self::Login,
            100 => Self::Exit,
            _ => Self::Invalid,
        }
    }

    /// 입력 토큰을 선택지로 변환합니다. 정수가 아니면 [`Invalid`](Self::Invalid)입니다.
    pub fn parse(token: &str) -> Self {
        token.trim().parse().map_or(Self::Invalid, Self::from_code)
    }
}

/// 메뉴에서 호출되는 작업입니다.
///
/// 작업 결과는 각 구현에서 기록하며, 메뉴는 결과와 관계없이 계속 진행합니다.
pub trait Operations {
    fn enroll(&mut self);
    fn delay(&mut self);
    fn revoke(&mut self, cert_id: &str);
    fn query(&mut self);
    fn reset_pin(&mut self, new_pin: &str);
    fn version(&mut self);
    fn login(&mut self);
}

/// 입력과 출력에 연결된 메뉴입니다.
pub struct Menu<R: BufRead, W: Write> {
    input: R,
    output: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, pending: VecDeque::new() }
    }

    // 다음 토큰을 읽습니다. 입력이 끝나면 `None`을 반환합니다.
    fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(str::to_owned));
        }
    }

    pub fn show(&mut self) -> io::Result<()> {
        self.output.write_all(MENU_TEXT.as_bytes())?;
        self.output.write_all(CHOICE_PROMPT.as_bytes())?;
        self.output.flush()
    }

    /// 선택지를 하나 읽습니다. 입력이 끝났다면 [`Invalid`](MenuChoice::Invalid)입니다.
    pub fn next_choice(&mut self) -> io::Result<MenuChoice> {
        Ok(self.next_token()?.map_or(MenuChoice::Invalid, |token| MenuChoice::parse(&token)))
    }

    /// 안내 문구를 출력하고 토큰을 하나 읽습니다.
    pub fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;

        let token = self.next_token()?;
        writeln!(self.output)?;

        Ok(token)
    }

    /// 종료를 선택하거나 잘못된 선택지가 입력될 때까지 메뉴를 반복합니다.
    pub fn run<O: Operations>(&mut self, ops: &mut O) -> io::Result<()> {
        loop {
            self.show()?;

            let choice = self.next_choice()?;
            info!("menu choice : {:?}", choice);

            match choice {
                MenuChoice::Enroll => ops.enroll(),
                MenuChoice::Delay => ops.delay(),
                MenuChoice::Revoke => match self.prompt(CERT_ID_PROMPT)? {
                    Some(cert_id) => ops.revoke(&cert_id),
                    None => break,
                },
                MenuChoice::Query => ops.query(),
                MenuChoice::ResetPin => match self.prompt(NEW_PIN_PROMPT)? {
                    Some(new_pin) => ops.reset_pin(&new_pin),
                    None => break,
                },
                MenuChoice::Version => ops.version(),
                MenuChoice::Login => ops.login(),
                MenuChoice::Exit => break,
                MenuChoice::Invalid => {
                    writeln!(self.output, "{}", INVALID_CHOICE)?;
                    warn!("{}", INVALID_CHOICE);
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Menu, MenuChoice, Operations, INVALID_CHOICE};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Operations for Recorder {
        fn enroll(&mut self) {
            self.calls.push("enroll".into());
        }
        fn delay(&mut self) {
            self.calls.push("delay".into());
        }
        fn revoke(&mut self, cert_id: &str) {
            self.calls.push(format!("revoke {}", cert_id));
        }
        fn query(&mut self) {
            self.calls.push("query".into());
        }
        fn reset_pin(&mut self, new_pin: &str) {
            self.calls.push(format!("reset_pin {}", new_pin));
        }
        fn version(&mut self) {
            self.calls.push("version".into());
        }
        fn login(&mut self) {
            self.calls.push("login".into());
        }
    }

    fn run(input: &str) -> (Vec<String>, String) {
        let mut output = Vec::new();
        let mut ops = Recorder::default();

        Menu::new(input.as_bytes(), &mut output).run(&mut ops).unwrap();

        (ops.calls, String::from_utf8(output).unwrap())
    }

    #[test]
    fn parse_choices() {
        assert_eq!(MenuChoice::parse("1"), MenuChoice::Enroll);
        assert_eq!(MenuChoice::parse(" 7 "), MenuChoice::Login);
        assert_eq!(MenuChoice::parse("100"), MenuChoice::Exit);

        for token in ["0", "8", "99", "101", "-1", "abc", ""] {
            assert_eq!(MenuChoice::parse(token), MenuChoice::Invalid);
        }
    }

    #[test]
    fn dispatch_until_exit() {
        let (calls, output) = run("1\n2\n4\n6\n7\n100\n1\n");

        assert_eq!(calls, vec!["enroll", "delay", "query", "version", "login"]);
        assert!(!output.contains(INVALID_CHOICE));
    }

    #[test]
    fn prompts_for_arguments() {
        let (calls, output) = run("3\nCERT-1\n5 654321\n100\n");

        assert_eq!(calls, vec!["revoke CERT-1", "reset_pin 654321"]);
        assert!(output.contains("enter certificate id"));
        assert!(output.contains("at least 6 characters"));
    }

    #[test]
    fn invalid_choice_ends_loop() {
        let (calls, output) = run("1\n42\n2\n");

        assert_eq!(calls, vec!["enroll"]);
        assert!(output.contains(INVALID_CHOICE));
    }

    #[test]
    fn unparsable_choice_ends_loop() {
        let (calls, output) = run("enroll\n1\n");

        assert!(calls.is_empty());
        assert!(output.contains(INVALID_CHOICE));
    }

    #[test]
    fn end_of_input_ends_loop() {
        let (calls, output) = run("6\n");

        assert_eq!(calls, vec!["version"]);
        assert!(output.contains(INVALID_CHOICE));
    }

    #[test]
    fn end_of_input_at_prompt() {
        let (calls, _) = run("3\n");
        assert!(calls.is_empty());
    }
}
