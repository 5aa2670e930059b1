use crate::render::describe;
use plz_lookup::error::AppError;
use plz_lookup::{AddressDirectory, AddressLookupController, Page};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  ort <name>      type into the locality field
  plz <code>      type into the postal code field
  wahl <code>     pick a postal code from the offered list
  seite <n>       request result page n (1-based)
  nochmal         retry lookups that failed to reach the directory
  zeige           print the current form
  hilfe           print this help
  ende            quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Locality(String),
    PostalCode(String),
    Select(String),
    Page(Page),
    Retry,
    Show,
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let input = match command.to_lowercase().as_str() {
        "ort" | "locality" => Input::Locality(rest.to_string()),
        "plz" | "postal" => Input::PostalCode(rest.to_string()),
        "wahl" | "select" => {
            if rest.is_empty() {
                return Err("wahl needs a postal code".to_string());
            }
            Input::Select(rest.to_string())
        }
        "seite" | "page" => Input::Page(rest.parse::<Page>().map_err(|err| err.to_string())?),
        "nochmal" | "retry" => Input::Retry,
        "zeige" | "show" => Input::Show,
        "hilfe" | "help" | "?" => Input::Help,
        "ende" | "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}', try 'hilfe'")),
    };

    Ok(Some(input))
}

/// Line-oriented stand-in for the form: every line is one complete edit.
pub(crate) async fn run<D>(controller: &AddressLookupController<D>) -> Result<(), AppError>
where
    D: AddressDirectory + 'static,
{
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let input = match parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(message) => {
                println!("  {message}");
                continue;
            }
        };

        match input {
            Input::Locality(text) => {
                controller.on_locality_edit(text);
                print!("{}", describe(&controller.settled().await));
            }
            Input::PostalCode(text) => {
                controller.on_postal_code_edit(text);
                print!("{}", describe(&controller.settled().await));
            }
            Input::Select(code) => match controller.on_candidate_select(&code) {
                Ok(()) => print!("{}", describe(&controller.snapshot())),
                Err(err) => println!("  {err}"),
            },
            Input::Page(page) => {
                controller.set_page(page);
                print!("{}", describe(&controller.settled().await));
            }
            Input::Retry => {
                if controller.retry() == 0 {
                    println!("  nothing to retry");
                } else {
                    print!("{}", describe(&controller.settled().await));
                }
            }
            Input::Show => print!("{}", describe(&controller.snapshot())),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
        }
    }

    controller.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_edits_with_inner_spaces() {
        assert_eq!(
            parse("ort  Frankfurt am Main "),
            Ok(Some(Input::Locality("Frankfurt am Main".to_string())))
        );
        assert_eq!(parse("PLZ 80331"), Ok(Some(Input::PostalCode("80331".to_string()))));
        assert_eq!(parse("ort"), Ok(Some(Input::Locality(String::new()))));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn page_must_be_positive() {
        assert_eq!(parse("seite 3"), Ok(Some(Input::Page(Page::new(3).expect("valid")))));
        assert!(parse("seite 0").is_err());
        assert_eq!(
            parse("seite zwei"),
            Err("page must be a positive whole number, got 'zwei'".to_string())
        );
        assert!(parse("seite").is_err());
    }

    #[test]
    fn selection_requires_a_code() {
        assert!(parse("wahl").is_err());
        assert_eq!(parse("wahl 10115"), Ok(Some(Input::Select("10115".to_string()))));
    }

    #[test]
    fn unknown_commands_are_reported() {
        let err = parse("suche Berlin").expect_err("unknown command");
        assert!(err.contains("suche"));
    }
}
