use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    addressable completions bash > ~/.bash_completion.d/addressable\n\n\
                  Generate zsh completions:\n    addressable completions zsh > ~/.zfunc/_addressable\n\n\
                  Generate fish completions:\n    addressable completions fish > ~/.config/fish/completions/addressable.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
