use anyhow::{Context, bail};
use statecraft::StandardAction;

/// One step of a counter session, parsed from the command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Increment,
    Decrement,
    Set(i64),
    Reset,
    /// Double the current count (action creator)
    Double,
    /// Set the count from a background thread after a delay (async action creator)
    SetLater(i64),
    /// A string-tagged action given as JSON, e.g. `{"type":"set","payload":3}`
    Raw(StandardAction),
}

/// Parse `args` (without the program name) into commands
///
/// ```text
/// inc | dec | reset | double | set <n> | later <n> | json <action>
/// ```
pub fn parse<I, S>(args: I) -> anyhow::Result<Vec<Command>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    let mut commands = Vec::new();

    while let Some(arg) = args.next() {
        let command = match arg.as_ref() {
            "inc" | "+" => Command::Increment,
            "dec" | "-" => Command::Decrement,
            "reset" => Command::Reset,
            "double" => Command::Double,
            "set" => Command::Set(number(args.next(), "set")?),
            "later" => Command::SetLater(number(args.next(), "later")?),
            "json" => {
                let raw = args.next().context("json expects an action")?;
                let action = serde_json::from_str(raw.as_ref())
                    .with_context(|| format!("invalid action: {}", raw.as_ref()))?;
                Command::Raw(action)
            }
            other => bail!("unknown command: {}", other),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn number<S: AsRef<str>>(arg: Option<S>, command: &str) -> anyhow::Result<i64> {
    let arg = arg.with_context(|| format!("{} expects a number", command))?;
    arg.as_ref()
        .parse()
        .with_context(|| format!("{} expects a number, got {}", command, arg.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() -> anyhow::Result<()> {
        let commands = parse(["inc", "+", "dec", "set", "7", "double", "later", "-3", "reset"])?;
        assert_eq!(
            commands,
            vec![
                Command::Increment,
                Command::Increment,
                Command::Decrement,
                Command::Set(7),
                Command::Double,
                Command::SetLater(-3),
                Command::Reset,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_json_action() -> anyhow::Result<()> {
        let commands = parse(["json", r#"{"type":"set","payload":3}"#])?;
        assert_eq!(
            commands,
            vec![Command::Raw(StandardAction::with_payload(
                "set",
                serde_json::json!(3)
            ))]
        );
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(["set"]).is_err());
        assert!(parse(["set", "seven"]).is_err());
        assert!(parse(["json", "{"]).is_err());

        let err = parse(["jump"]).unwrap_err();
        assert_eq!(err.to_string(), "unknown command: jump");
    }
}
