use std::env;
use std::ffi::OsString;
use std::io::stdout;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};
use log::{debug, info};

use api_explorer_core::actions::Explorer;
use api_explorer_core::client::ResourceClient;
use api_explorer_core::config::{self, Overrides};
use api_explorer_core::error::{Error, Result};
use api_explorer_core::schema::Schema;
use api_explorer_core::session::JsonFileSessionStore;
use api_explorer_core::tree::build_tree;

use api_explorer_cli::cli_args::{early_options, Args};
use api_explorer_cli::dynamic::{build_command, invocation};
use api_explorer_cli::http::HttpClient;
use api_explorer_cli::picker::TerminalPicker;
use api_explorer_cli::process::{CommandEditor, CommandPager};
use api_explorer_cli::prompt::StdinPrompter;

const BINARY_NAME: &str = "apx";

fn execute() -> Result<()> {
    let raw_args: Vec<OsString> = env::args_os().collect();

    // The schema decides which commands exist, so it is loaded before parsing
    let early = early_options(&raw_args);
    let config = config::read_config(&early.config_path)?;
    let schema_path = config.schema_path(early.schema_path);
    debug!("Schema path: {schema_path:?}");
    let schema = Schema::load(schema_path.as_deref())?;

    let tree = build_tree(BINARY_NAME, &schema);
    let matches = build_command(Args::command(), &tree).get_matches_from(raw_args);
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let (action, inputs) =
        invocation(&tree, &matches).map_err(|path| Error::IncompleteCommand(path.join(" ")))?;

    let settings = config.resolve(Overrides {
        host: args.host,
        token: args.token,
        schema_path: args.schema_path,
        session_path: args.session_path,
    });
    info!("Session file: `{}`", settings.session_path);
    let session = JsonFileSessionStore::new(&settings.session_path);

    let mut http = if action.needs_client() {
        Some(HttpClient::new(settings.connection()?))
    } else {
        None
    };

    let mut picker = TerminalPicker;
    let mut pager = CommandPager::new(args.pager);
    let mut editor = CommandEditor::new(args.editor);
    let mut prompter = StdinPrompter;
    let mut output = stdout();

    let mut explorer = Explorer {
        schema: &schema,
        client: http.as_mut().map(|client| client as &mut dyn ResourceClient),
        session: &session,
        picker: &mut picker,
        pager: &mut pager,
        editor: &mut editor,
        prompter: &mut prompter,
        output: &mut output,
    };

    explorer.run(action, &inputs)
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
