fn main() -> anyhow::Result<()> {
    form_runner::cli::main()
}
