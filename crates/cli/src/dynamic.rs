//! Turns the generated command tree into `clap` commands and back.

use clap::{Arg, ArgMatches, Command};
use log::debug;

use api_explorer_core::resolve::Inputs;
use api_explorer_core::tree::{Action, CommandNode, FlagSpec};

fn flag_arg(flag: &FlagSpec) -> Arg {
    let mut arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .value_name("VALUE")
        .required(flag.required);

    if let Some(usage) = &flag.usage {
        arg = arg.help(usage.clone());
    }

    arg
}

fn node_command(node: &CommandNode) -> Command {
    let mut command = Command::new(node.name.clone());

    if let Some(usage) = &node.usage {
        command = command.about(usage.clone());
    }

    for flag in &node.flags {
        command = command.arg(flag_arg(flag));
    }

    for child in node.children.values() {
        command = command.subcommand(node_command(child));
    }

    // Groups do nothing on their own
    if node.action.is_none() {
        command = command.subcommand_required(true).arg_required_else_help(true);
    }

    command
}

/// Attaches the commands of `tree` to `root`.
pub fn build_command(root: Command, tree: &CommandNode) -> Command {
    tree.children
        .values()
        .fold(root, |root, child| root.subcommand(node_command(child)))
        .subcommand_required(true)
        .arg_required_else_help(true)
}

/// Finds the invoked leaf and collects the flag values given along the way.
///
/// Returns the path of command names that was invoked when it doesn't end in
/// a runnable command.
pub fn invocation<'t>(
    tree: &'t CommandNode,
    matches: &ArgMatches,
) -> Result<(&'t Action, Inputs), Vec<String>> {
    let mut node = tree;
    let mut matches = matches;
    let mut path = Vec::new();
    let mut inputs = Inputs::new();

    while let Some((name, sub_matches)) = matches.subcommand() {
        path.push(name.to_string());
        let Some(child) = node.child(name) else {
            return Err(path);
        };

        for flag in &child.flags {
            if let Some(value) = sub_matches.get_one::<String>(&flag.name) {
                inputs.insert(flag.name.clone(), value.clone());
            }
        }

        node = child;
        matches = sub_matches;
    }

    debug!("Invoked `{}` with {inputs:?}", path.join(" "));

    match &node.action {
        Some(action) => Ok((action, inputs)),
        None => Err(path),
    }
}
