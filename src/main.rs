fn main() -> anyhow::Result<()> {
    vpd_monitor::run()
}
