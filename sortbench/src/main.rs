fn main() -> anyhow::Result<()> {
    sortbench_cli::run()
}
