fn main() {
    previsit_lib::run()
}
