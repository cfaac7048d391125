/// Agent roles as numbered by the backend (`GET /me` returns `role: [1..5]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    Support = 1,
    Trainer = 2,
    Sales = 3,
    Attendant = 4,
    Admin = 5,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Support,
        Role::Trainer,
        Role::Sales,
        Role::Attendant,
        Role::Admin,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Role::ALL.into_iter().find(|role| *role as u8 == code)
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of roles held by the logged-in agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Unknown codes are ignored.
    pub fn from_codes(codes: &[u8]) -> Self {
        codes
            .iter()
            .filter_map(|code| Role::from_code(*code))
            .fold(RoleSet::default(), |set, role| set.with(role))
    }

    pub fn with(self, role: Role) -> Self {
        RoleSet(self.0 | role.bit())
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// Admins get the delete and user-management actions.
    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }
}
