use trellis::application;
use trellis::controller;
use trellis::Module;
use trellis_di::instance_provider::ComponentInstancePtr;
use trellis_di::Component;

// a provider shared by all components which depend on it
#[derive(Component)]
#[injectable]
struct UserService;

impl UserService {
    fn users(&self) -> Vec<&'static str> {
        vec!["alice", "bob"]
    }
}

#[derive(Component)]
struct UserController {
    service: ComponentInstancePtr<UserService>,
}

// routes are prefixed with the controller path, so both handlers are mapped to "/users/"
#[controller(path = "/users")]
impl UserController {
    #[get("/")]
    fn get_all_users(&self) {
        println!("Returning all users: {:?}", self.service.users());
    }

    #[post("/")]
    fn create_user(&self) {
        println!("Creating user...");
    }
}

// only classes listed in the module can be resolved during bootstrap
#[derive(Module)]
#[module(providers = [UserService], controllers = [UserController])]
struct UsersModule;

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let mut application = application::create_default().expect("unable to create application");

    // logs "Mapped GET /users/ -> UserController.get_all_users()" and the POST route, then invokes
    // both handlers once
    let routes = application
        .bootstrap::<UsersModule>()
        .expect("error bootstrapping module");

    for route in &routes {
        println!("{} {} -> {}()", route.verb(), route.full_path(), route.method());
    }
}
