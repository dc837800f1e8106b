//! Library integration tests.

use outpost::OutpostError;

#[test]
fn error_types_are_public() {
    let err = OutpostError::UnknownPrerequisite {
        step: "tool:sqlmap".into(),
        prerequisite: "pkg:git".into(),
    };
    assert!(err.to_string().contains("pkg:git"));
    assert!(err.is_plan_error());
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> outpost::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use outpost::cli::{Cli, Commands};

    let cli = Cli::parse_from(["outpost", "check", "--json"]);
    if let Some(Commands::Check(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Check command");
    }
}
