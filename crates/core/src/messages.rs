//! User-facing (localized) messages.
//!
//! Clients match on these strings, so they are part of the wire contract.

// Controllers
pub const USER_NOT_FOUND: &str = "Пользователь не найден";
pub const AVATAR_USER_NOT_FOUND: &str = "Пользователь с указанным _id не найден";
pub const CARD_NOT_FOUND: &str = "Карточка с указанным _id не найдена";
pub const LIKE_CARD_NOT_FOUND: &str = "Передан несуществующий _id карточки";
pub const CARD_DELETE_FORBIDDEN: &str = "Недостаточно прав для удаления карточки";
pub const CARD_DELETED: &str = "Карточка успешно удалена";
pub const CARD_CREATE_INVALID: &str = "Переданы некорректные данные при создании карточки";
pub const BAD_CREDENTIALS: &str = "Неправильные почта или пароль";
pub const LOGIN_OK: &str = "Успешная авторизация";
pub const ROUTE_NOT_FOUND: &str = "Запрашиваемый ресурс не найден";

// Authentication
pub const AUTH_REQUIRED: &str = "Необходима авторизация";
pub const TOKEN_INVALID: &str = "Неверный токен авторизации";
pub const TOKEN_EXPIRED: &str = "Срок действия токена истек";
pub const TOKEN_WITHOUT_IDENTITY: &str = "Невалидный токен";

// Error normalization
pub const VALIDATION_FAILED: &str = "Ошибка валидации данных";
pub const EMAIL_TAKEN: &str = "Пользователь с таким email уже существует";
pub const PASSWORD_PROCESSING: &str = "Ошибка при обработке пароля";
pub const INTERNAL: &str = "На сервере произошла ошибка";

// Field formats
pub const INVALID_NAME: &str = "Имя может содержать только буквы, пробелы и дефисы";
pub const INVALID_CARD_NAME: &str =
    "Название карточки может содержать только буквы, цифры, пробелы и дефисы";
pub const INVALID_AVATAR_URL: &str = "Некорректный формат URL для аватара";
pub const INVALID_IMAGE_URL: &str = "Некорректный формат URL для изображения";
pub const INVALID_EMAIL: &str = "Некорректный формат email";
pub const PASSWORD_TOO_SHORT: &str = "Пароль должен содержать минимум 6 символов";
pub const INVALID_USER_ID: &str = "Некорректный формат ID пользователя";
pub const INVALID_CARD_ID: &str = "Некорректный формат ID карточки";

/// `Поле "<field>" обязательно для заполнения`
pub fn required(field: &str) -> String {
    format!("Поле \"{field}\" обязательно для заполнения")
}

/// `Минимальная длина поля "<field>" - <n> символа`
pub fn min_length(field: &str, n: usize) -> String {
    format!("Минимальная длина поля \"{field}\" - {n} {}", chars_word(n))
}

/// `Максимальная длина поля "<field>" - <n> символов`
pub fn max_length(field: &str, n: usize) -> String {
    format!("Максимальная длина поля \"{field}\" - {n} {}", chars_word(n))
}

/// `Некорректный <path>: <value>`
pub fn cast_failed(path: &str, value: &str) -> String {
    format!("Некорректный {path}: {value}")
}

fn chars_word(n: usize) -> &'static str {
    match (n % 10, n % 100) {
        (1, r) if r != 11 => "символ",
        (2..=4, r) if !(12..=14).contains(&r) => "символа",
        _ => "символов",
    }
}
