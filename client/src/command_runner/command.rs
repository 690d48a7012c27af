#[derive(Debug, PartialEq)]
pub enum Command {
    Help,
    Ping,
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    Put { local: String, remote: Option<String>, block_size: Option<u64> },
    Get { remote: String, local: String },
    Ls { path: Option<String>, long: bool },
    Mkdir { path: String },
    Rmdir { path: String },
    Rm { path: String },
    Health { path: String },
    Status,
    Datanodes { detailed: bool },
    Config,
    Exit,
}

pub const USAGE: &str = "\
help                                      show this message
ping                                      check the namenode
register <user> <password>                create an account
login <user> <password>                   start a session
logout                                    end the session
put <local> [remote] [--block-size N]     upload a file
get <remote> <local>                      download a file
ls [path] [-l]                            list a directory
mkdir <path>                              create a directory
rmdir <path>                              remove an empty directory
rm <path>                                 remove a file
health <path>                             check that every block of a file is reachable
status                                    cluster and account summary
datanodes [-d]                            list active datanodes
config                                    show client configuration
exit                                      quit";

fn usage_error(command: &str) -> String {
    let line = USAGE
        .lines()
        .find(|line| line.split_whitespace().next() == Some(command))
        .map(|line| line.split("  ").next().unwrap_or(line).trim())
        .unwrap_or(command);
    format!("Invalid {command} usage, expected : {line}")
}

fn take_flag(tokens: &mut Vec<&str>, wanted: &str) -> bool {
    let before = tokens.len();
    tokens.retain(|token| *token != wanted);
    tokens.len() != before
}

/// `Ok(None)` for a blank line
pub fn parse_command(input: &str) -> Result<Option<Command>, String> {
    let mut tokens: Vec<&str> = input.split_whitespace().collect();
    let Some(name) = tokens.first().copied() else {
        return Ok(None);
    };
    let command = match name {
        "help" => Command::Help,
        "ping" => Command::Ping,
        "logout" => Command::Logout,
        "status" => Command::Status,
        "config" => Command::Config,
        "exit" | "quit" => Command::Exit,
        "register" | "login" => {
            let [_, username, password] = tokens[..] else {
                return Err(usage_error(name));
            };
            let (username, password) = (username.to_owned(), password.to_owned());
            if name == "register" {
                Command::Register { username, password }
            } else {
                Command::Login { username, password }
            }
        }
        "put" => {
            let mut block_size = None;
            if let Some(position) = tokens.iter().position(|token| *token == "--block-size") {
                let value = tokens
                    .get(position + 1)
                    .and_then(|value| value.parse::<u64>().ok())
                    .filter(|value| *value > 0)
                    .ok_or_else(|| "--block-size needs a positive number".to_string())?;
                block_size = Some(value);
                tokens.drain(position..position + 2);
            }
            match tokens[..] {
                [_, local] => Command::Put {
                    local: local.to_owned(),
                    remote: None,
                    block_size,
                },
                [_, local, remote] => Command::Put {
                    local: local.to_owned(),
                    remote: Some(remote.to_owned()),
                    block_size,
                },
                _ => return Err(usage_error(name)),
            }
        }
        "get" => {
            let [_, remote, local] = tokens[..] else {
                return Err(usage_error(name));
            };
            Command::Get {
                remote: remote.to_owned(),
                local: local.to_owned(),
            }
        }
        "ls" => {
            let long = take_flag(&mut tokens, "-l");
            match tokens[..] {
                [_] => Command::Ls { path: None, long },
                [_, path] => Command::Ls {
                    path: Some(path.to_owned()),
                    long,
                },
                _ => return Err(usage_error(name)),
            }
        }
        "datanodes" => {
            let detailed = take_flag(&mut tokens, "-d");
            if tokens.len() != 1 {
                return Err(usage_error(name));
            }
            Command::Datanodes { detailed }
        }
        "mkdir" | "rmdir" | "rm" | "health" => {
            let [_, path] = tokens[..] else {
                return Err(usage_error(name));
            };
            let path = path.to_owned();
            match name {
                "mkdir" => Command::Mkdir { path },
                "rmdir" => Command::Rmdir { path },
                "rm" => Command::Rm { path },
                _ => Command::Health { path },
            }
        }
        other => {
            return Err(format!(
                "Invalid command {other}, use help to list available commands"
            ));
        }
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_put_with_flag_anywhere() {
        assert_eq!(
            parse_command("put --block-size 8 ./a.txt /docs/a.txt\n"),
            Ok(Some(Command::Put {
                local: "./a.txt".into(),
                remote: Some("/docs/a.txt".into()),
                block_size: Some(8)
            }))
        );
        assert_eq!(
            parse_command("put ./a.txt"),
            Ok(Some(Command::Put {
                local: "./a.txt".into(),
                remote: None,
                block_size: None
            }))
        );
        assert!(parse_command("put ./a.txt --block-size 0").is_err());
    }

    #[test]
    fn flags_and_arity() {
        assert_eq!(
            parse_command("ls -l /docs"),
            Ok(Some(Command::Ls {
                path: Some("/docs".into()),
                long: true
            }))
        );
        assert_eq!(
            parse_command("datanodes -d"),
            Ok(Some(Command::Datanodes { detailed: true }))
        );
        assert_eq!(parse_command("   \n"), Ok(None));
        let error = parse_command("login alice").unwrap_err();
        assert!(error.contains("login <user> <password>"));
        assert!(parse_command("frobnicate").is_err());
    }
}
