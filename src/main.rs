fn main() {
    sastwatch::app::startup::startup();
}
