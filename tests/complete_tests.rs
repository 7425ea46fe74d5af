use lfr::core::complete::{FileCandidate, LineContext, complete_line, match_word};
use lfr::core::words::{CMD_WORDS, OPT_WORDS};
use lfr::core::{Domain, complete};

#[test]
fn test_shared_prefix_without_space_for_several_matches() {
    let c = match_word("up", &["up", "updir"]);
    assert_eq!(c.matches, vec!["up", "updir"]);
    assert_eq!(c.longest, "up");
}

#[test]
fn test_single_match_ends_with_space() {
    let c = match_word("qu", &["quit"]);
    assert_eq!(c.matches, vec!["quit"]);
    assert_eq!(c.longest, "quit ");
}

#[test]
fn test_catalog_completion_stays_inside_catalog() {
    for token in ["", "c", "cmd-", "half", "mark", "zz"] {
        let c = complete(token, Domain::Commands);
        for m in &c.matches {
            assert!(CMD_WORDS.contains(&m.as_str()), "{m} is not a command");
            assert!(m.starts_with(token));
        }
        assert!(c.longest.starts_with(token));
    }

    let opts = complete("no", Domain::Options);
    assert!(opts.matches.iter().all(|m| OPT_WORDS.contains(&m.as_str())));
    assert!(opts.matches.contains(&"nohidden".to_string()));
}

#[test]
fn test_line_completion_uses_user_commands_and_files() {
    let ctx = LineContext {
        user_cmds: vec!["trash".to_string(), "up".to_string()],
        files: vec![
            FileCandidate {
                name: "docs".to_string(),
                is_dir: true,
            },
            FileCandidate {
                name: "draft.md".to_string(),
                is_dir: false,
            },
        ],
    };

    let cmd = complete_line("tra", &ctx);
    assert_eq!(cmd.line, "trash ");

    let cd = complete_line("cd d", &ctx);
    assert_eq!(cd.matches, vec!["docs"]);
    assert_eq!(cd.line, "cd docs ");

    let any = complete_line("delete d", &ctx);
    assert_eq!(any.matches, vec!["docs", "draft.md"]);
    assert_eq!(any.line, "delete d");

    let shell_arg = complete_line("$vim dr", &ctx);
    assert_eq!(shell_arg.line, "$vim draft.md ");
}
